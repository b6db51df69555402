use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_token_expiry_minutes: i64,
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "hub-identity".into(),
            audience: "hub-api".into(),
            access_token_expiry_minutes: 60,
            leeway_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        issuer: &str,
        audience: &str,
        token_type: TokenType,
        expiry: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.as_str().to_string(),
            organization_id: None,
        }
    }

    pub fn with_organization_id(mut self, org_id: Uuid) -> Self {
        self.organization_id = Some(org_id.to_string());
        self
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID in claims: {e}"))
    }

    /// Tenant of the caller. Tokens without an organization claim fall into the nil tenant.
    pub fn organization_id(&self) -> Result<Uuid> {
        match self.organization_id.as_deref() {
            Some(org) => {
                Uuid::parse_str(org).map_err(|e| anyhow!("Invalid organization ID in claims: {e}"))
            }
            None => Ok(Uuid::nil()),
        }
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access.as_str()
    }
}

/// Verifies session tokens handed over by the identity provider.
///
/// Issuing is kept for the provider side and for tests; the HTTP surface only
/// ever validates.
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(config: JwtConfig, secret: &str) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(anyhow!(
                "JWT secret must be at least {MIN_SECRET_LEN} characters"
            ));
        }
        Ok(Self {
            config,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn from_secret(secret: &str) -> Result<Self> {
        Self::new(JwtConfig::default(), secret)
    }

    pub fn generate_access_token(&self, claims: Claims) -> Result<String> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to encode access token: {e}"))
    }

    pub fn issue_access_token(&self, user_id: Uuid, organization_id: Option<Uuid>) -> Result<String> {
        let expiry = Utc::now() + Duration::minutes(self.config.access_token_expiry_minutes);
        let mut claims = Claims::new(
            user_id,
            &self.config.issuer,
            &self.config.audience,
            TokenType::Access,
            expiry,
        );
        if let Some(org) = organization_id {
            claims = claims.with_organization_id(org);
        }
        self.generate_access_token(claims)
    }

    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.leeway = self.config.leeway_seconds;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let token_data = self.validate_token(token)?;

        if !token_data.claims.is_access_token() {
            return Err(anyhow!("Token is not an access token"));
        }

        Ok(token_data.claims)
    }
}

pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-test-secret-that-is-long-enough-for-hs256";

    #[test]
    fn test_short_secret_rejected() {
        assert!(JwtManager::from_secret("short").is_err());
    }

    #[test]
    fn test_issue_and_validate() {
        let manager = JwtManager::from_secret(SECRET).unwrap();
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();

        let token = manager.issue_access_token(user_id, Some(org_id)).unwrap();
        let claims = manager.validate_access_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.organization_id().unwrap(), org_id);
    }

    #[test]
    fn test_missing_organization_is_nil_tenant() {
        let manager = JwtManager::from_secret(SECRET).unwrap();
        let token = manager.issue_access_token(Uuid::new_v4(), None).unwrap();
        let claims = manager.validate_access_token(&token).unwrap();
        assert_eq!(claims.organization_id().unwrap(), Uuid::nil());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let manager = JwtManager::from_secret(SECRET).unwrap();
        let claims = Claims::new(
            Uuid::new_v4(),
            "hub-identity",
            "hub-api",
            TokenType::Refresh,
            Utc::now() + Duration::minutes(5),
        );
        let token = manager.generate_access_token(claims).unwrap();
        assert!(manager.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let manager = JwtManager::from_secret(SECRET).unwrap();
        let claims = Claims::new(
            Uuid::new_v4(),
            "hub-identity",
            "someone-else",
            TokenType::Access,
            Utc::now() + Duration::minutes(5),
        );
        let token = manager.generate_access_token(claims).unwrap();
        assert!(manager.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = JwtManager::from_secret(SECRET).unwrap();
        let claims = Claims::new(
            Uuid::new_v4(),
            "hub-identity",
            "hub-api",
            TokenType::Access,
            Utc::now() - Duration::hours(2),
        );
        let token = manager.generate_access_token(claims).unwrap();
        assert!(manager.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_unread_provider_claims_are_ignored() {
        let manager = JwtManager::from_secret(SECRET).unwrap();
        let user_id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": user_id.to_string(),
            "iss": "hub-identity",
            "aud": "hub-api",
            "exp": now + 300,
            "iat": now,
            "nbf": now,
            "jti": Uuid::new_v4().to_string(),
            "type": "access",
            "email": "ada@example.com",
            "roles": ["admin"]
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let claims = manager.validate_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.organization_id().unwrap(), Uuid::nil());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
