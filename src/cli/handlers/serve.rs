//! Serve command handler

use crate::config::StorageBackend;
use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::i18n::LocaleResolver;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the server, or with `dry_run` only checks the configuration.
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Server startup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }
        Server::new(self.config).run().await?;
        Ok(())
    }

    /// Checks everything the server would check before binding.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        let locales = LocaleResolver::from_config(&self.config.i18n)?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        match self.config.storage.backend {
            StorageBackend::Database => println!(
                "✓ Content stored in PostgreSQL, assets under {}",
                self.config.storage.assetstore_dir
            ),
            StorageBackend::Memory => println!("✓ Content kept in memory"),
        }
        println!(
            "✓ Required files: {}",
            self.config.upload.required_files.join(", ")
        );
        println!("✓ Locale attribute: {}", locales.attribute());

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
