use axum::http::{Method, StatusCode};
use axum::routing::MethodFilter;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }

    pub fn filter(&self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Delete => MethodFilter::DELETE,
        }
    }
}

/// Which bearer credential goes upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// The caller's credential; calls without one are refused locally with 401
    Required,
    /// No caller credential needed; the service token is sent when configured
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTransform {
    Empty,
    Json,
    /// JSON object in, `application/x-www-form-urlencoded` out
    JsonToForm,
    /// Raw bytes forwarded with the caller's multipart content type and boundary
    Multipart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Verbatim,
    /// A bare JSON array from upstream becomes `{ key: [...] }`
    WrapIn(&'static str),
}

/// What a non-2xx upstream answer turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrors {
    Forward,
    /// 200 with the fallback body, so list pages render empty instead of failing
    Mask,
}

#[derive(Debug, Clone, Copy)]
pub struct Fallback {
    pub status: StatusCode,
    pub body: fn() -> Value,
}

/// One proxied crew service resource.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub name: &'static str,
    pub verb: Verb,
    /// Upstream path, `{param}` placeholders filled from route params
    pub upstream: &'static str,
    pub auth: Auth,
    pub body: BodyTransform,
    pub required_fields: &'static [&'static str],
    /// Field renames applied when building a form body
    pub form_renames: &'static [(&'static str, &'static str)],
    pub response: ResponseShape,
    pub upstream_errors: UpstreamErrors,
    pub fallback: Option<Fallback>,
    pub timeout: Option<Duration>,
}

impl Endpoint {
    pub const fn new(name: &'static str, verb: Verb, upstream: &'static str) -> Self {
        Self {
            name,
            verb,
            upstream,
            auth: Auth::Required,
            body: match verb {
                Verb::Get | Verb::Delete => BodyTransform::Empty,
                Verb::Post | Verb::Put | Verb::Patch => BodyTransform::Json,
            },
            required_fields: &[],
            form_renames: &[],
            response: ResponseShape::Verbatim,
            upstream_errors: UpstreamErrors::Forward,
            fallback: None,
            timeout: None,
        }
    }

    pub const fn get(name: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Verb::Get, upstream)
    }

    pub const fn post(name: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Verb::Post, upstream)
    }

    pub const fn put(name: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Verb::Put, upstream)
    }

    pub const fn patch(name: &'static str, upstream: &'static str) -> Self {
        Self::new(name, Verb::Patch, upstream)
    }

    pub const fn public(mut self) -> Self {
        self.auth = Auth::Public;
        self
    }

    pub const fn body(mut self, body: BodyTransform) -> Self {
        self.body = body;
        self
    }

    pub const fn require(mut self, fields: &'static [&'static str]) -> Self {
        self.required_fields = fields;
        self
    }

    pub const fn rename_form_fields(mut self, renames: &'static [(&'static str, &'static str)]) -> Self {
        self.form_renames = renames;
        self
    }

    pub const fn wrap_in(mut self, key: &'static str) -> Self {
        self.response = ResponseShape::WrapIn(key);
        self
    }

    pub const fn mask_upstream_errors(mut self) -> Self {
        self.upstream_errors = UpstreamErrors::Mask;
        self
    }

    pub const fn fallback(mut self, status: StatusCode, body: fn() -> Value) -> Self {
        self.fallback = Some(Fallback { status, body });
        self
    }

    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
