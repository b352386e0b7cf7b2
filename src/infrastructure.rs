pub mod auth;
pub mod email;
pub mod kv;
pub mod limiter;
pub mod utils;
