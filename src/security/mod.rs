pub mod auth;
pub mod cors;
pub mod jwt;
pub mod validation;

pub use auth::{AuthenticatedUser, OptionalAuth};
pub use cors::{create_cors_layer, CorsConfig};
pub use jwt::{extract_bearer_token, Claims, JwtConfig, JwtManager, TokenType};
pub use validation::{
    parse_enum, parse_uuid, validate_email, validate_max_length, validate_phone, validate_range,
    validate_string_required, validate_url, ValidationError, ValidationResult, Validator,
};
