use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ceremony::{Ceremony, DEFAULT_EXTENSION_TYPE, ENGINE_OWNED_EXTENSIONS};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document did not parse into an [`ExtensionConfig`].
    #[error("invalid extension config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The engine parses this codepoint itself and will not delegate it.
    #[error("extension type {0} is handled by the handshake engine")]
    EngineOwnedExtension(u16),
}

/// Settings for one [`super::ExtensionMultiplexer`].
///
/// ```toml
/// extension_type = 65309
/// initiator_ceremony = "authentication"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionConfig {
    /// Reserved extension codepoint; callbacks for any other type are omitted.
    pub extension_type: u16,
    /// Ceremony an Initiator runs on connections the application did not
    /// seed explicitly. `None` means such connections do not offer the
    /// extension.
    pub initiator_ceremony: Option<Ceremony>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            extension_type: DEFAULT_EXTENSION_TYPE,
            initiator_ceremony: None,
        }
    }
}

impl ExtensionConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed documents or unknown keys, and any
    /// error from [`ExtensionConfig::validate`].
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the settings can be registered with the engine.
    ///
    /// # Errors
    /// [`ConfigError::EngineOwnedExtension`] when `extension_type` is one the
    /// engine parses itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if ENGINE_OWNED_EXTENSIONS.binary_search(&self.extension_type).is_ok() {
            return Err(ConfigError::EngineOwnedExtension(self.extension_type));
        }
        Ok(())
    }
}
