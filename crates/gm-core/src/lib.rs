pub mod config;
pub mod run_lock;
pub mod store;
pub mod types;
