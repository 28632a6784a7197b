use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrismError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown cognitive function: {0}")]
    UnknownFunction(String),

    #[error("Unknown type code: {0}")]
    UnknownTypeCode(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid prototype for {code}: {reason}")]
    InvalidPrototype { code: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PrismError>;
