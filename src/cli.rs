use crate::build;
use crate::config::Config;
use crate::config::constants::CONFIG_FILE;
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Build into dist, then serve with live reload and watch for changes
    Develop,
    /// Minified build into build (demo settings)
    Demo,
    /// Minified, purged and optimized build into build
    #[command(alias = "prod")]
    Production,
}

/// Front-end asset pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Defaults to `develop`
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.cmd.unwrap_or(Commands::Develop)
    }
}

/// Load configuration from `root` and run the selected entry point
pub async fn run_command(command: Commands, root: &Path) -> Result<()> {
    let config = Arc::new(Config::discover(root)?);
    info!(
        "Running {:?} with sources in {} (config: {})",
        command,
        config.paths.src.base.display(),
        root.join(CONFIG_FILE).display()
    );

    match command {
        Commands::Develop => build::develop(config).await,
        Commands::Demo => build::demo(config).await,
        Commands::Production => build::production(config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_develop() {
        let cli = Cli::try_parse_from(["assetflow"]).unwrap();
        assert_eq!(cli.command(), Commands::Develop);
    }

    #[test]
    fn test_subcommands() {
        let parse = |arg: &str| Cli::try_parse_from(["assetflow", arg]).unwrap().command();
        assert_eq!(parse("develop"), Commands::Develop);
        assert_eq!(parse("demo"), Commands::Demo);
        assert_eq!(parse("production"), Commands::Production);
        assert_eq!(parse("prod"), Commands::Production);
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["assetflow", "deploy"]).is_err());
    }
}
