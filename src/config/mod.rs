use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub session: SessionConfig,
    pub gate: GateConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

/// The external crew management service every proxy route forwards to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Bearer token for server-to-server calls made on behalf of anonymous callers
    pub service_token: Option<String>,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub token_cookie: String,
    pub user_cookie: String,
    pub secure_cookies: bool,
    pub cookie_max_age_secs: u64,
}

/// A path prefix that requires a credential, and where to send callers without one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedArea {
    pub prefix: String,
    pub login_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub areas: Vec<ProtectedArea>,
    pub default_login_path: String,
    pub redirect_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    /// Signing secret shared with the crew service, used for local token verification
    pub jwt_secret: String,
}

/// Object storage used for temporary document download links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub bucket: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub link_ttl_secs: u64,
}

impl ProtectedArea {
    pub fn new(prefix: impl Into<String>, login_path: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            login_path: login_path.into(),
        }
    }

    pub fn covers(&self, path: &str) -> bool {
        path_is_under(path, &self.prefix)
    }

    pub fn is_login(&self, path: &str) -> bool {
        path_is_under(path, &self.login_path)
    }
}

fn path_is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl GateConfig {
    pub fn area_for(&self, path: &str) -> Option<&ProtectedArea> {
        self.areas.iter().find(|area| area.covers(path))
    }

    /// Login page responsible for `path`: its area's login page, or the portal-wide one
    pub fn login_path_for(&self, path: &str) -> &str {
        self.area_for(path)
            .map(|area| area.login_path.as_str())
            .unwrap_or(&self.default_login_path)
    }
}

impl StorageConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.access_key.is_some() && self.secret_key.is_some()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("PORTAL_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Upstream overrides
        if let Ok(v) = env::var("CREW_API_BASE_URL") {
            self.upstream.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("CREW_API_SERVICE_TOKEN") {
            self.upstream.service_token = non_empty(v);
        }
        if let Ok(v) = env::var("CREW_API_TIMEOUT_SECS") {
            self.upstream.connect_timeout_secs = v.parse().unwrap_or(self.upstream.connect_timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.token_cookie = v;
        }
        if let Ok(v) = env::var("SESSION_USER_COOKIE_NAME") {
            self.session.user_cookie = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.session.secure_cookies = v.parse().unwrap_or(self.session.secure_cookies);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_ENDPOINT") {
            self.storage.endpoint = non_empty(v);
        }
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_ACCESS_KEY") {
            self.storage.access_key = non_empty(v);
        }
        if let Ok(v) = env::var("STORAGE_SECRET_KEY") {
            self.storage.secret_key = non_empty(v);
        }
        if let Ok(v) = env::var("STORAGE_LINK_TTL_SECS") {
            self.storage.link_ttl_secs = v.parse().unwrap_or(self.storage.link_ttl_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                max_request_size_bytes: 25 * 1024 * 1024, // 25MB, scanned certificates
            },
            upstream: UpstreamConfig {
                base_url: "http://localhost:8000/api/v1".to_string(),
                service_token: None,
                connect_timeout_secs: 10,
            },
            session: SessionConfig {
                token_cookie: "token".to_string(),
                user_cookie: "user".to_string(),
                secure_cookies: false,
                cookie_max_age_secs: 60 * 60 * 24, // 1 day
            },
            gate: Self::default_gate(),
            security: SecurityConfig {
                cors_origins: Vec::new(),
                jwt_secret: String::new(),
            },
            storage: StorageConfig {
                endpoint: None,
                bucket: "crew-documents".to_string(),
                access_key: None,
                secret_key: None,
                link_ttl_secs: 15 * 60,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.max_request_size_bytes = 15 * 1024 * 1024;
        config.upstream.base_url = "https://staging-api.crewportal.example.com/api/v1".to_string();
        config.upstream.connect_timeout_secs = 5;
        config.session.secure_cookies = true;
        config.security.cors_origins = vec!["https://staging.crewportal.example.com".to_string()];
        config.storage.link_ttl_secs = 10 * 60;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.max_request_size_bytes = 10 * 1024 * 1024;
        config.upstream.base_url = "https://api.crewportal.example.com/api/v1".to_string();
        config.upstream.connect_timeout_secs = 5;
        config.session.secure_cookies = true;
        config.session.cookie_max_age_secs = 60 * 60 * 8;
        config.security.cors_origins = vec!["https://crewportal.example.com".to_string()];
        config.storage.link_ttl_secs = 5 * 60;
        config
    }

    fn default_gate() -> GateConfig {
        GateConfig {
            areas: vec![
                ProtectedArea::new("/admin", "/admin/login"),
                ProtectedArea::new("/seafarer", "/login"),
                ProtectedArea::new("/shipowner", "/login"),
            ],
            default_login_path: "/login".to_string(),
            redirect_param: "redirect".to_string(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
