//! Generic forwarding to the crew management service.
//!
//! Every proxy route is an [`Endpoint`] descriptor run through
//! [`Proxy::forward`]: check the credential, reshape the body, call the
//! upstream, then translate the answer (verbatim, wrapped, masked or replaced
//! by the endpoint's fallback).

pub mod body;
pub mod endpoint;
pub mod error;
pub mod route;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;
use uuid::Uuid;

pub use body::Outbound;
pub use endpoint::{Auth, BodyTransform, Endpoint, Fallback, ResponseShape, UpstreamErrors, Verb};
pub use error::ProxyError;
pub use route::route;

use crate::config::UpstreamConfig;
use crate::error::ApiError;
use crate::middleware::SessionContext;

/// An inbound request, reduced to what forwarding needs
#[derive(Debug, Clone, Default)]
pub struct Inbound {
    pub credential: Option<String>,
    pub params: HashMap<String, String>,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Inbound {
    pub fn new(session: &SessionContext, headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            credential: session.credential().map(str::to_string),
            content_type: headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }
}

/// What the caller gets back: a status and an optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ProxyReply {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body: Some(body) }
    }

    fn from_fallback(fallback: &Fallback) -> Self {
        Self::new(fallback.status, (fallback.body)())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

/// Client for the crew management service
#[derive(Debug, Clone)]
pub struct Proxy {
    client: reqwest::Client,
    base_url: String,
    base: Url,
    service_token: Option<String>,
}

impl Proxy {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProxyError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| ProxyError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ProxyError::InvalidBaseUrl(base_url));
        }

        // No overall timeout: only endpoints that declare one get one
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("crew-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            base,
            service_token: config.service_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Upstream URL for `endpoint`, with route params encoded as path segments
    pub fn upstream_url(&self, endpoint: &Endpoint, inbound: &Inbound) -> Result<String, ProxyError> {
        let segments = fill_segments(endpoint.upstream, &inbound.params)?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ProxyError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(&segments);
        url.set_query(inbound.query.as_deref());

        Ok(url.into())
    }

    /// Forward `inbound` to the crew service as described by `endpoint`
    pub async fn forward(&self, endpoint: &Endpoint, inbound: Inbound) -> Result<ProxyReply, ApiError> {
        let bearer = match endpoint.auth {
            Auth::Required => Some(
                inbound
                    .credential
                    .clone()
                    .ok_or_else(|| ApiError::unauthorized("Authentication required"))?,
            ),
            Auth::Public => self.service_token.clone(),
        };

        let outbound = body::prepare(endpoint, inbound.content_type.as_deref(), &inbound.body)?;
        let url = self.upstream_url(endpoint, &inbound)?;
        let request_id = Uuid::new_v4();
        let method = endpoint.verb.method();

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json")
            .header("x-request-id", request_id.to_string());
        if let Some(timeout) = endpoint.timeout {
            request = request.timeout(timeout);
        }
        if let Some(token) = &bearer {
            request = request.bearer_auth(token);
        }
        request = match outbound {
            Outbound::None => request,
            Outbound::Json(value) => request.json(&value),
            Outbound::Form(form) => request
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(form),
            Outbound::Multipart { content_type, body } => {
                request.header(header::CONTENT_TYPE, content_type).body(body)
            }
        };

        tracing::debug!(
            "[{}] {} {} {} token={}",
            request_id,
            endpoint.name,
            method,
            url,
            redact_token(bearer.as_deref())
        );

        let started = Instant::now();
        let result = send(request).await;
        let elapsed_ms = started.elapsed().as_millis();

        match result {
            Ok((status, content_type, bytes)) => {
                tracing::info!(
                    "[{}] {} {} {} -> {} in {}ms",
                    request_id,
                    endpoint.name,
                    method,
                    url,
                    status.as_u16(),
                    elapsed_ms
                );
                translate(endpoint, status, content_type.as_deref(), &bytes)
            }
            Err(err) => {
                tracing::warn!(
                    "[{}] {} {} {} failed after {}ms: {}",
                    request_id,
                    endpoint.name,
                    method,
                    url,
                    elapsed_ms,
                    err
                );
                match &endpoint.fallback {
                    Some(fallback) => Ok(ProxyReply::from_fallback(fallback)),
                    None => Err(err.into()),
                }
            }
        }
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<(StatusCode, Option<String>, Bytes), ProxyError> {
    let response = request.send().await?;
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?;
    Ok((status, content_type, bytes))
}

/// Turn an upstream answer into the reply for the caller
pub fn translate(
    endpoint: &Endpoint,
    status: StatusCode,
    content_type: Option<&str>,
    bytes: &Bytes,
) -> Result<ProxyReply, ApiError> {
    let body = if bytes.is_empty() {
        None
    } else if !is_json(content_type) {
        tracing::warn!(
            "{} answered {} with non-JSON content type {:?}",
            endpoint.name,
            status.as_u16(),
            content_type
        );
        return invalid_response(endpoint);
    } else {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("{} answered with malformed JSON: {}", endpoint.name, e);
                return invalid_response(endpoint);
            }
        }
    };

    if status.is_success() {
        let body = match (endpoint.response, body) {
            (ResponseShape::WrapIn(key), Some(Value::Array(items))) => Some(json!({ key: items })),
            (_, body) => body,
        };
        return Ok(ProxyReply { status, body });
    }

    match endpoint.upstream_errors {
        UpstreamErrors::Forward => Ok(ProxyReply { status, body }),
        UpstreamErrors::Mask => {
            tracing::warn!("Masking {} from {} as 200", status.as_u16(), endpoint.name);
            let body = endpoint
                .fallback
                .map(|fallback| (fallback.body)())
                .unwrap_or_else(|| json!({}));
            Ok(ProxyReply::new(StatusCode::OK, body))
        }
    }
}

fn invalid_response(endpoint: &Endpoint) -> Result<ProxyReply, ApiError> {
    match &endpoint.fallback {
        Some(fallback) => Ok(ProxyReply::from_fallback(fallback)),
        None => Err(ApiError::bad_gateway("Crew service returned an invalid response")),
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Split an upstream template into path segments, filling `{name}`
/// placeholders with raw route params. Encoding happens when the segments are
/// pushed onto the URL.
pub fn fill_segments(template: &str, params: &HashMap<String, String>) -> Result<Vec<String>, ProxyError> {
    template
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| fill_segment(segment, params))
        .collect()
}

fn fill_segment(segment: &str, params: &HashMap<String, String>) -> Result<String, ProxyError> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|i| open + i)
            .ok_or_else(|| ProxyError::MissingPathParam(rest[open..].to_string()))?;
        let name = &rest[open + 1..close];
        let value = params
            .get(name)
            .ok_or_else(|| ProxyError::MissingPathParam(name.to_string()))?;

        out.push_str(&rest[..open]);
        out.push_str(value);
        rest = &rest[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Log-safe hint of a bearer token: its first characters and length
pub fn redact_token(token: Option<&str>) -> String {
    match token {
        None => "-".to_string(),
        Some(t) => {
            let prefix: String = t.chars().take(6).collect();
            format!("{}…({} chars)", prefix, t.chars().count())
        }
    }
}
