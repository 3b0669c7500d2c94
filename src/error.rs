use thiserror::Error;

#[derive(Error, Debug)]
pub enum RolodexError {
    #[error("person not found: {id}")]
    NotFound { id: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("index bootstrap failed: {0}")]
    IndexBootstrap(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RolodexError>;

impl RolodexError {
    pub fn status_code(&self) -> u16 {
        match self {
            RolodexError::NotFound { .. } => 404,

            RolodexError::Validation(_) | RolodexError::Query(_) => 400,

            _ => 500,
        }
    }
}
