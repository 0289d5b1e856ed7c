//! Phone number registration: requesting and submitting verification codes.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// How the verification code is delivered
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CodeMethod {
    #[display("SMS")]
    Sms,
    #[display("VOICE")]
    Voice,
}

impl std::str::FromStr for CodeMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            "SMS" => Ok(CodeMethod::Sms),
            "VOICE" => Ok(CodeMethod::Voice),
            other => Err(format!("unknown code method {other}, expected SMS or VOICE")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VerificationResponse {
    pub success: bool,
}
