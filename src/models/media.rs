use crate::consts;
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[display("audio")]
    Audio,
    #[display("document")]
    Document,
    #[display("image")]
    Image,
    #[display("sticker")]
    Sticker,
    #[display("video")]
    Video,
}

impl MediaType {
    /// Largest file the platform accepts for this media type, in bytes
    pub fn max_allowed_size(&self) -> usize {
        match self {
            MediaType::Audio => consts::MAX_AUDIO_SIZE,
            MediaType::Document => consts::MAX_DOC_SIZE,
            MediaType::Image => consts::MAX_IMAGE_SIZE,
            MediaType::Sticker => consts::MAX_STICKER_SIZE,
            MediaType::Video => consts::MAX_VIDEO_SIZE,
        }
    }

    /// Only documents, images and videos carry a caption
    pub fn accepts_caption(&self) -> bool {
        matches!(
            self,
            MediaType::Document | MediaType::Image | MediaType::Video
        )
    }
}

/// Reference to a media object in an outgoing message.
///
/// Exactly one of `id` (an uploaded media id) or `link` (a public URL) must be
/// set; see [`MediaReference::check`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MediaReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Only used by documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl MediaReference {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn from_link(link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            ..Default::default()
        }
    }

    /// Returns why the reference is unusable, if it is
    pub fn check(&self) -> Result<(), String> {
        let has_id = self.id.as_deref().is_some_and(|id| !id.trim().is_empty());
        let has_link = self
            .link
            .as_deref()
            .is_some_and(|link| !link.trim().is_empty());

        match (has_id, has_link) {
            (true, false) | (false, true) => Ok(()),
            (false, false) => Err("media needs either an id or a link".into()),
            (true, true) => Err("media must not set both id and link".into()),
        }
    }
}
