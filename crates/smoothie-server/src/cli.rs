//! Command-line interface

use crate::telemetry::LogFormat;
use clap::{Parser, Subcommand};
use smoothie_core::{ConfigError, ShopConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Smoothie order counter
#[derive(Debug, Parser)]
#[command(name = "smoothie", version, about = "Smoothie order counter")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database (overrides the config file)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP surface
    Serve {
        /// Listen address (overrides the config file)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Skip nutrition lookups
        #[arg(long)]
        no_nutrition: bool,
    },

    /// Create the schema in the configured database
    Init,

    /// Add catalog rows from a JSON file; existing rows are left alone
    SeedCatalog {
        /// JSON array of `{"name": .., "lookup_key": ..}`
        file: PathBuf,
    },

    /// Print orders waiting to be filled
    Pending {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Load the config file (if any) and apply command-line overrides
    ///
    /// Nutrition lookups are switched off for every command except `serve`.
    ///
    /// # Errors
    /// - `ConfigError` if the file cannot be loaded or the result is invalid
    pub fn resolve_config(&self) -> Result<ShopConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ShopConfig::read(path)?,
            None => ShopConfig::new(),
        };

        if let Some(database) = &self.database {
            config = config.with_database(database.clone());
        }
        match &self.command {
            Command::Serve { bind, no_nutrition } => {
                if let Some(bind) = bind {
                    config = config.with_bind(*bind);
                }
                if *no_nutrition {
                    config.nutrition.enabled = false;
                }
            }
            // Only `serve` looks up nutrition
            Command::Init | Command::SeedCatalog { .. } | Command::Pending { .. } => {
                config.nutrition.enabled = false;
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_overrides_apply() {
        let cli = Cli::try_parse_from([
            "smoothie",
            "--database",
            ":memory:",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--no-nutrition",
        ])
        .unwrap();

        let config = cli.resolve_config().unwrap();
        assert!(config.store.is_in_memory());
        assert_eq!(config.server.bind, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert!(!config.nutrition.enabled);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["smoothie", "pending", "--json", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Pending { json: true }));
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoothie.toml");
        std::fs::write(&path, "[nutrition]\nenabled = false\n").unwrap();

        let cli = Cli::try_parse_from([
            "smoothie".as_ref(),
            "--config".as_ref(),
            path.as_os_str(),
            "init".as_ref(),
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();
        assert!(!config.nutrition.enabled);
    }

    #[test]
    fn admin_commands_ignore_nutrition_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoothie.toml");
        std::fs::write(&path, "[nutrition]\nbase_url = \"\"\ntimeout_secs = 0\n").unwrap();

        for command in ["init", "pending"] {
            let cli = Cli::try_parse_from([
                "smoothie".as_ref(),
                "--config".as_ref(),
                path.as_os_str(),
                command.as_ref(),
            ])
            .unwrap();
            let config = cli.resolve_config().unwrap();
            assert!(!config.nutrition.enabled);
        }

        let serve = Cli::try_parse_from([
            "smoothie".as_ref(),
            "--config".as_ref(),
            path.as_os_str(),
            "serve".as_ref(),
        ])
        .unwrap();
        assert!(matches!(serve.resolve_config(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let cli =
            Cli::try_parse_from(["smoothie", "--config", "/nonexistent/smoothie.toml", "init"])
                .unwrap();
        assert!(matches!(cli.resolve_config(), Err(ConfigError::Io { .. })));
    }
}
