pub const BASE_URL: &str = "https://graph.facebook.com/";
pub const LOWEST_SUPPORTED_VERSION: &str = "v16.0";
pub const MESSAGING_PRODUCT: &str = "whatsapp";
pub const RECIPIENT_TYPE_INDIVIDUAL: &str = "individual";

pub const MESSAGES_ENDPOINT: &str = "messages";
pub const QR_CODES_ENDPOINT: &str = "message_qrdls";
pub const REQUEST_CODE_ENDPOINT: &str = "request_code";
pub const VERIFY_CODE_ENDPOINT: &str = "verify_code";

/// Webhook change field carrying messages, statuses and their errors
pub const WEBHOOK_MESSAGES_FIELD: &str = "messages";

/// YYYY-MM-DD, as expected by the contact `birthday` field
pub const CONTACT_BIRTHDAY_DATE_FORMAT: &str = "%Y-%m-%d";

pub const MAX_AUDIO_SIZE: usize = 16 * 1024 * 1024;
pub const MAX_DOC_SIZE: usize = 100 * 1024 * 1024;
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;
pub const MAX_VIDEO_SIZE: usize = 16 * 1024 * 1024;
pub const MAX_STICKER_SIZE: usize = 100 * 1024;
