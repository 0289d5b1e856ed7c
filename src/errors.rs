use derive_more::{Display, Error};
use serde::Deserialize;

/// Characters kept on each side of a decode failure position
const FRAGMENT_RADIUS: usize = 32;

pub type Result<T> = std::result::Result<T, WhatsAppError>;

/// Error reported by the platform itself.
///
/// The fields are taken verbatim from the `error` object of the response body
/// so callers can branch on `code` (and `error_subcode`) the same way the
/// platform documentation does.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("platform error {code} ({title}): {details}")]
pub struct ApiError {
    /// HTTP status the platform answered with
    pub http_status: u16,
    pub code: i64,
    pub title: String,
    pub details: String,
    pub error_subcode: Option<i64>,
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, Display, Error)]
pub enum WhatsAppError {
    /// A request value is missing a required field or mixes exclusive ones
    #[display("invalid request: {_0}")]
    Validation(#[error(not(source))] String),
    /// The transport could not complete the call
    #[display("transport failure: {_0}")]
    Transport(#[error(not(source))] String),
    /// A response or notification body did not match the expected shape
    #[display("malformed payload: {message} (near `{fragment}`)")]
    Decode { message: String, fragment: String },
    #[display("{_0}")]
    Api(ApiError),
    #[display("request cancelled")]
    Cancelled,
}

impl WhatsAppError {
    /// Builds a [`WhatsAppError::Decode`] keeping the raw text around the failure
    pub fn decode(err: &serde_json::Error, raw: &[u8]) -> Self {
        Self::Decode {
            message: err.to_string(),
            fragment: fragment_around(raw, err.line(), err.column()),
        }
    }

    /// Platform error code, only for [`WhatsAppError::Api`]
    pub fn api_code(&self) -> Option<i64> {
        match self {
            WhatsAppError::Api(api_error) => Some(api_error.code),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WhatsAppError::Cancelled)
    }
}

fn fragment_around(raw: &[u8], line: usize, column: usize) -> String {
    let text = String::from_utf8_lossy(raw);

    // serde_json reports line 0 when the error has no position
    let line_text = match line {
        0 => text.lines().next(),
        n => text.lines().nth(n - 1),
    };
    let Some(line_text) = line_text else {
        return String::new();
    };

    let chars: Vec<char> = line_text.chars().collect();
    let center = column.saturating_sub(1).min(chars.len());
    let start = center.saturating_sub(FRAGMENT_RADIUS);
    let end = (center + FRAGMENT_RADIUS).min(chars.len());

    chars[start..end].iter().collect()
}

/// Error envelope returned by the Graph API on failures:
/// `{"error": {"message", "type", "code", "error_subcode", "error_data", "fbtrace_id"}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub error_data: Option<ErrorData>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorData {
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn into_api_error(self, http_status: u16) -> ApiError {
        let details = self
            .error_data
            .and_then(|data| data.details)
            .or(self.message)
            .unwrap_or_default();

        ApiError {
            http_status,
            code: self.code,
            title: self.title.or(self.error_type).unwrap_or_default(),
            details,
            error_subcode: self.error_subcode,
            fbtrace_id: self.fbtrace_id,
        }
    }
}
