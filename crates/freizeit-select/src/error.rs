use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("No activity is currently shown; run a fresh suggestion first")]
    NoCurrentActivity,
}

pub type Result<T> = std::result::Result<T, SelectError>;
