//! Capabilities a caller can request from the orchestration layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of work requested by the caller.
///
/// Chosen by the caller and immutable for the lifetime of a request. Each
/// capability has its own ordered fallback list of provider candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    ChatCompletion,
    TextToImage,
    TextToVideo,
    TextToSpeech,
    ImageToVideo,
}

impl Capability {
    /// Kebab-case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ChatCompletion => "chat-completion",
            Capability::TextToImage => "text-to-image",
            Capability::TextToVideo => "text-to-video",
            Capability::TextToSpeech => "text-to-speech",
            Capability::ImageToVideo => "image-to-video",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
