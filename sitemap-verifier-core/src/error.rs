use sitemap_verifier_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
