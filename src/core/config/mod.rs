use log::warn;

pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 604_800;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEV_JWT_SECRET: &str = "hub-development-secret-change-me-before-deploying";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub drive: DriveConfig,
    pub auth: AuthConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Clone, Debug)]
pub struct DriveConfig {
    pub server: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
    pub presign_expiry_secs: u64,
    pub max_upload_bytes: usize,
}

impl DriveConfig {
    /// The object store is only wired when an endpoint and credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.server.is_empty() && !self.access_key.is_empty() && !self.secret_key.is_empty()
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            region: "us-east-1".to_string(),
            bucket: "hub-files".to_string(),
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_str = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        fn parse<T: std::str::FromStr>(
            key: &'static str,
            raw: Option<String>,
            default: T,
        ) -> Result<T, ConfigError> {
            match raw {
                Some(value) => value
                    .parse()
                    .map_err(|_| ConfigError::Invalid { key, value }),
                None => Ok(default),
            }
        }

        let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let pool_size: u32 = parse("DATABASE_POOL_SIZE", get("DATABASE_POOL_SIZE"), 10)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_POOL_SIZE",
                value: "0".to_string(),
            });
        }

        let presign_expiry_secs = parse(
            "DRIVE_PRESIGN_EXPIRY_SECS",
            get("DRIVE_PRESIGN_EXPIRY_SECS"),
            DEFAULT_PRESIGN_EXPIRY_SECS,
        )?;
        if !(1..=MAX_PRESIGN_EXPIRY_SECS).contains(&presign_expiry_secs) {
            return Err(ConfigError::Invalid {
                key: "DRIVE_PRESIGN_EXPIRY_SECS",
                value: presign_expiry_secs.to_string(),
            });
        }

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) if secret.len() >= crate::security::jwt::MIN_SECRET_LEN => secret,
            Some(secret) => {
                return Err(ConfigError::Invalid {
                    key: "JWT_SECRET",
                    value: format!("<{} chars>", secret.len()),
                })
            }
            None => {
                warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(AppConfig {
            server: ServerConfig {
                host: get_str("SERVER_HOST", "0.0.0.0"),
                port: parse("SERVER_PORT", get("SERVER_PORT"), 8080)?,
                cors_allowed_origins,
            },
            database: DatabaseConfig { url, pool_size },
            drive: DriveConfig {
                server: get_str("DRIVE_SERVER", ""),
                access_key: get_str("DRIVE_ACCESS_KEY", ""),
                secret_key: get_str("DRIVE_SECRET_KEY", ""),
                region: get_str("DRIVE_REGION", "us-east-1"),
                bucket: get_str("DRIVE_BUCKET", "hub-files"),
                presign_expiry_secs,
                max_upload_bytes: parse(
                    "DRIVE_MAX_UPLOAD_BYTES",
                    get("DRIVE_MAX_UPLOAD_BYTES"),
                    DEFAULT_MAX_UPLOAD_BYTES,
                )?,
            },
            auth: AuthConfig {
                jwt_secret,
                issuer: get_str("JWT_ISSUER", "hub-identity"),
                audience: get_str("JWT_AUDIENCE", "hub-api"),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
