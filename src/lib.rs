//! Client for the WhatsApp Business Cloud API and decoder for the webhook
//! notifications it delivers.

pub mod client;
pub mod config;
pub mod consts;
pub mod errors;
pub mod logger;
pub mod messages;
pub mod models;
pub mod phone_numbers;
pub mod qrcodes;
pub mod transport;
pub mod webhooks;

pub use client::{Client, ClientBuilder};
pub use errors::{ApiError, Result, WhatsAppError};
pub use webhooks::decode_notification;
