pub mod email_sender;
pub mod kv_store;
