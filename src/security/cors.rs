use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<Method>,
    pub allowed_headers: Vec<header::HeaderName>,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
            allowed_headers: vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT],
            max_age_secs: 3600,
        }
    }
}

impl CorsConfig {
    pub fn with_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn build(self) -> CorsLayer {
        let restricted = !self.allowed_origins.is_empty();
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect();

        // A configured list never widens to `any`, even if every entry is rejected.
        let allow_origin = if !restricted {
            AllowOrigin::any()
        } else {
            if origins.is_empty() {
                warn!("No valid CORS origins configured; cross-origin requests are denied");
            }
            AllowOrigin::list(origins)
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(self.allowed_methods)
            .allow_headers(self.allowed_headers)
            .max_age(Duration::from_secs(self.max_age_secs))
    }
}

pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        info!("Creating CORS layer allowing any origin");
    } else {
        info!("Creating CORS layer with {} allowed origins", origins.len());
    }
    CorsConfig::default().with_origins(origins.to_vec()).build()
}
