//! Model-consumable content fragments.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// A unit of content handed to the reasoning model.
///
/// Produced from one file (or one page of a file) and consumed within the
/// same validation call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentFragment {
    /// Self-contained image payload.
    Image {
        /// MIME type of the encoded image (e.g. `image/jpeg`)
        mime_type: String,
        /// Base64 payload, standard alphabet with padding
        data: String,
    },
    /// Plain text.
    Text {
        /// Text content
        text: String,
        /// Originating file name, `None` for markers and instructions
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
}

impl ContentFragment {
    /// Encode raw image bytes into an image fragment.
    pub fn image(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Image {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Text extracted from a named file.
    pub fn text(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            source: Some(source.into()),
        }
    }

    /// Synthesized text with no originating file (section markers, instructions).
    pub fn marker(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            source: None,
        }
    }

    /// `data:` URI for image fragments, `None` for text.
    #[must_use = "returns the data URI"]
    pub fn data_uri(&self) -> Option<String> {
        match self {
            Self::Image { mime_type, data } => Some(format!("data:{mime_type};base64,{data}")),
            Self::Text { .. } => None,
        }
    }

    /// True for image fragments.
    #[inline]
    #[must_use = "returns whether this is an image"]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    /// Size of the carried payload in bytes (base64 length for images).
    #[inline]
    #[must_use = "returns payload size in bytes"]
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Image { data, .. } => data.len(),
            Self::Text { text, .. } => text.len(),
        }
    }
}
