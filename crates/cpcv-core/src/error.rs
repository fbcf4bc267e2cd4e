//! Error types for a validation run.
//!
//! Every failure is terminal for the run that raised it. Conversion failures
//! and model failures are kept apart so the caller can show a distinct
//! message for each, even though both are handled the same way (abort, keep
//! the uploaded files, let the user retry).

use thiserror::Error;

/// Error types that can occur while converting evidence or talking to the model.
///
/// # Examples
///
/// ```
/// use cpcv_core::CpcvError;
///
/// let err = CpcvError::conversion("bi.pdf", "page 2 failed to render");
/// assert!(err.is_conversion());
/// assert_eq!(err.to_string(), "Failed to convert 'bi.pdf': page 2 failed to render");
/// ```
#[derive(Error, Debug)]
pub enum CpcvError {
    /// A file could not be turned into content fragments.
    ///
    /// Raised for unreadable payloads, corrupt page structure, decode
    /// failures, or a conversion task that died. There is no partial
    /// recovery: one bad file aborts the whole run.
    #[error("Failed to convert '{file}': {reason}")]
    Conversion {
        /// Display name of the offending file
        file: String,
        /// What went wrong
        reason: String,
    },

    /// The reasoning model could not be reached or refused the request.
    ///
    /// Covers network and authentication failures and answers that carry no
    /// content at all.
    #[error("Model call failed: {0}")]
    ModelCall(String),

    /// The model answered, but not with a report matching the agreed shape.
    #[error("Malformed validation report: {0}")]
    MalformedReport(#[source] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error outside the model answer.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CpcvError {
    /// Shorthand for [`CpcvError::Conversion`].
    pub fn conversion(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Conversion {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures raised while turning files into fragments.
    #[inline]
    #[must_use = "returns whether this is a conversion failure"]
    pub const fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }

    /// True for failures of the model call or of its answer.
    #[inline]
    #[must_use = "returns whether this is a model failure"]
    pub const fn is_model_failure(&self) -> bool {
        matches!(self, Self::ModelCall(_) | Self::MalformedReport(_))
    }

    /// Message suitable for showing to the person who uploaded the files.
    #[must_use = "returns the user-facing message"]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Conversion { .. } | Self::Io(_) => {
                "Falha na conversão dos documentos. Por favor verifique os ficheiros e tente novamente."
            }
            Self::ModelCall(_) | Self::MalformedReport(_) | Self::Json(_) => {
                "Falha na análise dos documentos. Por favor verifique a chave API e tente novamente."
            }
        }
    }
}

/// Type alias for [`Result<T, CpcvError>`].
pub type Result<T> = std::result::Result<T, CpcvError>;
