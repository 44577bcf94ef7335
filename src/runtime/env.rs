//! Environment and install-location lookups.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn base_dir_impl(&self) -> Result<PathBuf> {
        let exe = env::current_exe().context("Failed to locate the running executable")?;
        exe.parent()
            .map(|dir| dir.to_path_buf())
            .with_context(|| format!("Executable path {:?} has no parent directory", exe))
    }
}
