use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("no detection run yet")]
    NoRunYet,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
