//! Runtime abstraction for system operations.
//!
//! Everything the updater touches outside the network goes through
//! [`Runtime`], so the downloader and the configuration layer can be tested
//! against a mock.
//!
//! - `env` - environment variables and the install location
//! - `fs` - directory and file creation

mod env;
mod fs;

use anyhow::Result;
use std::env as std_env;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWrite;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    /// Directory holding the running executable.
    fn base_dir(&self) -> Result<PathBuf>;

    // File System
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Creates or truncates `path` for writing.
    fn create_file(&self, path: &Path) -> Result<Box<dyn AsyncWrite + Send + Unpin>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn base_dir(&self) -> Result<PathBuf> {
        self.base_dir_impl()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn AsyncWrite + Send + Unpin>> {
        self.create_file_impl(path)
    }
}
