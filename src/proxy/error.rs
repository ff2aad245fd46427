use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid crew service base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Missing path parameter: {0}")]
    MissingPathParam(String),

    #[error("Crew service request failed: {0}")]
    Client(#[from] reqwest::Error),
}
