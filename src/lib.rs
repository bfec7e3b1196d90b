pub mod config;
pub mod error;
pub mod files;
pub mod identity;
pub mod server;
pub mod storage;
