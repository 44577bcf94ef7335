pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod http;
pub mod runtime;
pub mod source;
