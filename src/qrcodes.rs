//! QR codes that open a chat with the business number, prefilled with a
//! message. Stored under `/{phone_number_id}/message_qrdls`.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    #[display("PNG")]
    Png,
    #[display("SVG")]
    Svg,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub prefilled_message: String,
    pub image_format: ImageFormat,
}

impl CreateRequest {
    pub fn new(prefilled_message: impl Into<String>, image_format: ImageFormat) -> Self {
        Self {
            prefilled_message: prefilled_message.into(),
            image_format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateResponse {
    pub code: String,
    pub prefilled_message: String,
    pub deep_link_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Information {
    pub code: String,
    pub prefilled_message: String,
    pub deep_link_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListResponse {
    #[serde(default)]
    pub data: Vec<Information>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
