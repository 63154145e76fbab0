//! Construction-time configuration of a [`Verisigner`](crate::Verisigner).

use std::{env, fmt, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// Encoding assumed when none is configured.
pub const DEFAULT_ENCODING: &str = "windows-1252";

/// A shared secret. Its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct Secret(Vec<u8>);

impl Secret {
    /// The raw secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Whether the secret has zero length.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Secret {
    fn from(secret: String) -> Self {
        Self(secret.into_bytes())
    }
}

impl From<&str> for Secret {
    fn from(secret: &str) -> Self {
        Self(secret.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Secret {
    fn from(secret: Vec<u8>) -> Self {
        Self(secret)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Verisigner configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct VerisignerConfig {
    /// Secret shared with the bank, used to verify `B02K_MAC`.
    pub input_secret: Secret,
    /// Secret shared with the destination, used to compute the outbound hash.
    pub output_secret: Secret,
    /// Base URL verified callbacks are redirected to.
    pub success_base_url: String,
    /// URL returned for every rejected callback.
    pub error_url: String,
    /// Label of the bank's legacy single-byte encoding.
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

impl VerisignerConfig {
    /// Create a configuration using the default encoding.
    pub fn new<S, U>(input_secret: S, output_secret: S, success_base_url: U, error_url: U) -> Self
    where
        S: Into<Secret>,
        U: Into<String>,
    {
        Self {
            input_secret: input_secret.into(),
            output_secret: output_secret.into(),
            success_base_url: success_base_url.into(),
            error_url: error_url.into(),
            encoding: default_encoding(),
        }
    }

    /// Replace the encoding label.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Parse configuration from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from `TUPAS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let require = |key| lookup(key).ok_or(ConfigError::MissingEnvVar(key));
        Ok(Self {
            input_secret: require("TUPAS_INPUT_SECRET")?.into(),
            output_secret: require("TUPAS_OUTPUT_SECRET")?.into(),
            success_base_url: require("TUPAS_SUCCESS_URL")?,
            error_url: require("TUPAS_ERROR_URL")?,
            encoding: lookup("TUPAS_ENCODING").unwrap_or_else(default_encoding),
        })
    }
}

/// The error type associated with configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or not unicode.
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    /// Failed to read the configuration file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Failed to parse TOML.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    /// The encoding label is not recognised.
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
    /// The encoding is recognised but is not a single-byte encoding.
    #[error("not a single-byte encoding: {0}")]
    NotSingleByte(&'static str),
    /// The success base URL could not be parsed.
    #[error("invalid success url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// A secret is empty.
    #[error("empty {0}")]
    EmptySecret(&'static str),
}
