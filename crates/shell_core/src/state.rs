//! Process-wide shell state

use crate::ShellConfig;
use parking_lot::RwLock;
use shell_ops::{NativeBackend, Shell, ShellBackend, ShellResult, UrlHandler};
use std::path::PathBuf;

/// Configuration plus the shell it drives
pub struct ShellContext<B: ShellBackend = NativeBackend> {
    /// Current configuration
    pub config: RwLock<ShellConfig>,

    /// Writer side of the custom URL handler
    url_handler: UrlHandler,

    shell: Shell<B>,
}

impl ShellContext<NativeBackend> {
    pub fn new(config: ShellConfig) -> Self {
        Self::with_backend(config, NativeBackend::new())
    }
}

impl<B: ShellBackend> ShellContext<B> {
    pub fn with_backend(config: ShellConfig, backend: B) -> Self {
        let url_handler = UrlHandler::default();
        let context = Self {
            config: RwLock::new(ShellConfig::default()),
            shell: Shell::new(backend, url_handler.clone()),
            url_handler,
        };
        context.apply_config(config);
        context
    }

    pub fn shell(&self) -> &Shell<B> {
        &self.shell
    }

    /// Replace the configuration and push it into the shell
    pub fn apply_config(&self, config: ShellConfig) {
        self.url_handler.set(config.shell.url_handler.clone());
        self.shell.set_silent(config.shell.silent_operations);

        if config.shell.url_handler.trim().is_empty() {
            tracing::debug!("URL handler: system default");
        } else {
            tracing::info!("URL handler: {}", config.shell.url_handler);
        }

        *self.config.write() = config;
    }

    /// Delete files, honoring the recycle bin setting
    pub fn delete_files(&self, files: &[PathBuf]) -> ShellResult {
        let recycle = self.config.read().shell.use_recycle_bin;
        self.shell.shell_delete(files, recycle)
    }

    /// Save the current configuration
    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.read().save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shell_ops::backend::{NoTrash, SpawnBackend};
    use std::fs;
    use tempfile::TempDir;

    fn context(config: ShellConfig) -> ShellContext<SpawnBackend> {
        ShellContext::with_backend(config, SpawnBackend::with_trash(Box::new(NoTrash)))
    }

    #[test]
    fn test_apply_config_updates_handler() {
        let ctx = context(ShellConfig::default());
        assert_eq!(ctx.shell().url_handler().snapshot(), None);
        assert!(!ctx.shell().is_silent());

        let mut config = ShellConfig::default();
        config.shell.url_handler = "mybrowser '{0}'".to_string();
        config.shell.silent_operations = true;
        ctx.apply_config(config);

        assert_eq!(
            ctx.shell().url_handler().snapshot().as_deref(),
            Some("mybrowser '{0}'")
        );
        assert!(ctx.shell().is_silent());
        assert!(ctx.config.read().shell.silent_operations);
    }

    #[test]
    fn test_delete_files_honors_recycle_setting() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let ctx = context(ShellConfig::default());
        let r = ctx.delete_files(&[file.clone()]);
        assert!(r.is_success());
        // recycling without a trash degrades to a permanent delete
        assert!(r.is_degraded());
        assert!(!file.exists());

        fs::write(&file, "a").unwrap();
        let mut config = ShellConfig::default();
        config.shell.use_recycle_bin = false;
        ctx.apply_config(config);

        let r = ctx.delete_files(&[file.clone()]);
        assert!(r.is_success());
        assert!(!r.is_degraded());
        assert!(!file.exists());
    }
}
