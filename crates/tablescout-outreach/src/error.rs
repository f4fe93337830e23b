use tablescout_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutreachError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
