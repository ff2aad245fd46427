//! Temporary download links for stored crew documents.
//!
//! Links point straight at object storage and carry a short-lived HS256 token
//! keyed by the storage secret; the storage gateway checks it, we only mint it.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::StorageConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkClaims {
    pub key: String,
    pub bucket: String,
    pub access_key: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadLink {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object storage is not configured")]
    NotConfigured,

    #[error("invalid storage endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("link signing error: {0}")]
    Signing(String),
}

pub fn sign_download_link(config: &StorageConfig, file_key: &str) -> Result<DownloadLink, StorageError> {
    sign_download_link_at(config, file_key, Utc::now())
}

fn sign_download_link_at(
    config: &StorageConfig,
    file_key: &str,
    now: DateTime<Utc>,
) -> Result<DownloadLink, StorageError> {
    let (endpoint, access_key, secret_key) = match (&config.endpoint, &config.access_key, &config.secret_key) {
        (Some(endpoint), Some(access_key), Some(secret_key)) => (endpoint, access_key, secret_key),
        _ => return Err(StorageError::NotConfigured),
    };

    let expires_at = now + Duration::seconds(config.link_ttl_secs as i64);
    let key = file_key.trim_start_matches('/');

    let claims = LinkClaims {
        key: key.to_string(),
        bucket: config.bucket.clone(),
        access_key: access_key.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret_key.as_bytes()))
        .map_err(|e| StorageError::Signing(e.to_string()))?;

    let mut url = Url::parse(endpoint).map_err(|e| StorageError::InvalidEndpoint(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| StorageError::InvalidEndpoint(endpoint.clone()))?
        .pop_if_empty()
        .push(&config.bucket)
        .extend(key.split('/'));
    url.query_pairs_mut().append_pair("token", &token);

    Ok(DownloadLink {
        url: url.to_string(),
        expires_at,
    })
}
