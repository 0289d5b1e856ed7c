//! # Request Dispatcher
//!
//! Turns a [`Request`] built from a [`ConfigSnapshot`] into a single transport
//! call and decodes what comes back. Nothing in here retries, caches or
//! touches the shared client state.

use super::state::ConfigSnapshot;
use crate::{
    errors::{ApiError, ErrorEnvelope, Result, WhatsAppError},
    transport::{Method, Transport, TransportRequest, TransportResponse},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Where a request goes: `{base_url}/{api_version}/{sender_id}/{endpoints...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Short operation name, only used for logging
    pub name: &'static str,
    pub base_url: String,
    pub api_version: String,
    /// Phone number id or business account id the resource hangs from
    pub sender_id: String,
    pub endpoints: Vec<String>,
}

impl RequestContext {
    /// Addresses a sub-resource of the configured phone number
    pub fn phone_number(name: &'static str, config: &ConfigSnapshot, endpoints: &[&str]) -> Self {
        Self::with_sender(name, config, config.phone_number_id.clone(), endpoints)
    }

    /// Addresses a sub-resource of the configured business account
    pub fn business_account(
        name: &'static str,
        config: &ConfigSnapshot,
        endpoints: &[&str],
    ) -> Self {
        Self::with_sender(name, config, config.business_account_id.clone(), endpoints)
    }

    fn with_sender(
        name: &'static str,
        config: &ConfigSnapshot,
        sender_id: String,
        endpoints: &[&str],
    ) -> Self {
        Self {
            name,
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
            sender_id,
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Builds the fully addressed url, appending `query` pairs in order
    pub fn url(&self, query: &[(String, String)]) -> Result<String> {
        if self.sender_id.trim().is_empty() {
            return Err(WhatsAppError::Validation(format!(
                "{}: sender id (phone number or business account) is not configured",
                self.name
            )));
        }

        let mut joined = self.base_url.trim_end_matches('/').to_string();
        let segments = [self.api_version.as_str(), self.sender_id.as_str()]
            .into_iter()
            .chain(self.endpoints.iter().map(String::as_str));
        for segment in segments {
            let segment = segment.trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            joined.push('/');
            joined.push_str(segment);
        }

        let mut url = reqwest::Url::parse(&joined).map_err(|err| {
            WhatsAppError::Validation(format!("{}: invalid url {joined}: {err}", self.name))
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url.to_string())
    }
}

/// Everything the dispatcher needs for one call
#[derive(Debug, Clone)]
pub struct Request<P> {
    pub context: RequestContext,
    pub method: Method,
    pub bearer: String,
    pub query: Vec<(String, String)>,
    pub payload: Option<P>,
}

impl Request<()> {
    /// Request without a JSON body (GET, DELETE, query-only POST)
    pub fn without_body(context: RequestContext, method: Method, bearer: &str) -> Self {
        Self {
            context,
            method,
            bearer: bearer.to_string(),
            query: Vec::new(),
            payload: None,
        }
    }
}

impl<P: Serialize> Request<P> {
    pub fn with_body(context: RequestContext, method: Method, bearer: &str, payload: P) -> Self {
        Self {
            context,
            method,
            bearer: bearer.to_string(),
            query: Vec::new(),
            payload: Some(payload),
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    fn into_transport_request(self) -> Result<TransportRequest> {
        let url = self.context.url(&self.query)?;

        let body = self
            .payload
            .map(|payload| serde_json::to_vec(&payload))
            .transpose()
            .map_err(|err| {
                WhatsAppError::Validation(format!(
                    "{}: payload is not serializable: {err}",
                    self.context.name
                ))
            })?;

        Ok(TransportRequest {
            method: self.method,
            url,
            headers: vec![
                ("Authorization".into(), format!("Bearer {}", self.bearer)),
                ("Content-Type".into(), "application/json".into()),
            ],
            body,
        })
    }
}

/// Executes `request` through `transport` exactly once.
///
/// Cancelling `cancel` before or while the transport call runs drops the
/// in-flight call and returns [`WhatsAppError::Cancelled`].
pub async fn send<P, T>(
    transport: &dyn Transport,
    cancel: &CancellationToken,
    request: Request<P>,
) -> Result<T>
where
    P: Serialize,
    T: DeserializeOwned,
{
    if cancel.is_cancelled() {
        return Err(WhatsAppError::Cancelled);
    }

    let name = request.context.name;
    let transport_request = request.into_transport_request()?;
    debug!(
        "sending {name} request: {method} {url}",
        method = transport_request.method,
        url = transport_request.url
    );

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(WhatsAppError::Cancelled),
        response = transport.execute(transport_request) => response
            .map_err(|err| WhatsAppError::Transport(format!("{err:#}")))?,
    };

    decode_response(name, response)
}

fn decode_response<T: DeserializeOwned>(name: &str, response: TransportResponse) -> Result<T> {
    if response.is_success() {
        return serde_json::from_slice(&response.body)
            .map_err(|err| WhatsAppError::decode(&err, &response.body));
    }

    let api_error = match serde_json::from_slice::<ErrorEnvelope>(&response.body) {
        Ok(envelope) => envelope.error.into_api_error(response.status),
        Err(_) => ApiError {
            http_status: response.status,
            code: i64::from(response.status),
            title: format!("HTTP {}", response.status),
            details: String::from_utf8_lossy(&response.body).into_owned(),
            error_subcode: None,
            fbtrace_id: None,
        },
    };

    warn!(
        "{name} request rejected with status {status}: {api_error}",
        status = response.status
    );

    Err(WhatsAppError::Api(api_error))
}
