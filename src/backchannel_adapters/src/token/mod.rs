pub mod jwks_key_provider;
pub mod jwt_logout_token_decoder;
pub mod key_provider;
