use thiserror::Error;

#[derive(Debug, Error)]
pub enum QualifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
