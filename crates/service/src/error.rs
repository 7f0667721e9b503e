use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("insufficient permission")]
    Forbidden,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl Error {
    pub fn comment_not_found(id: i64) -> Self {
        Error::NotFound {
            resource: "comment",
            id,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
