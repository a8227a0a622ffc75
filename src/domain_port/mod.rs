// store

mod refresh_token_store;

pub use refresh_token_store::*;

// repo

mod user_repo;

pub use user_repo::*;
