pub mod auth_guard;
mod auth_service_impl;
mod session_revoker;
mod token_codec_jwt;
mod token_issuer;
mod user_service_impl;

pub use auth_service_impl::*;
pub use session_revoker::*;
pub use token_codec_jwt::*;
pub use token_issuer::TokenIssuer;
pub use user_service_impl::*;
