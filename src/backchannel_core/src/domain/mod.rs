pub mod client_registration;
pub mod error;
pub mod invalidation;
pub mod logout_authentication;
pub mod logout_token;
pub mod session;
