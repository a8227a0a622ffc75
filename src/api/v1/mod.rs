mod cookies;
mod error;
mod handler;
mod router;

pub use cookies::*;
pub use error::{ApiError, ApiErrorCode, recover_error};
pub use router::{routes, with_verification};
