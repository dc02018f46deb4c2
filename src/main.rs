//! `installed-apps` - command-line host for the `getInstalledApps` query
//!
//! Prints the bridge reply as JSON on stdout. Logs go to stderr (or a log file
//! when configured), so stdout stays machine-readable.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use installed_apps::{
    AppListerError, InstalledApplicationLister, InstalledApplicationRecord,
    bridge::{BridgeResponse, query_with_deadline},
    config::{ConfigManager, ListerConfig, RegistryBackend},
    error::get_user_friendly_error,
    lister::{LabelPolicy, SortOrder},
    registry::platform_registry,
    utils,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "installed-apps", version, about = "List user-installed applications")]
struct Cli {
    /// Configuration file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run getInstalledApps and print the reply
    List(ListArgs),
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default configuration
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(Args)]
struct ListArgs {
    /// Registry backend
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Registry snapshot for the snapshot backend
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Handling of packages whose label cannot be resolved
    #[arg(long, value_enum)]
    label_policy: Option<LabelPolicyArg>,

    /// Result ordering
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Query deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Pretty-print the reply
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Auto,
    Snapshot,
}

#[derive(Clone, Copy, ValueEnum)]
enum LabelPolicyArg {
    Strict,
    Fallback,
    Skip,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Registry,
    Name,
}

impl ListArgs {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut ListerConfig) {
        if let Some(backend) = self.backend {
            config.registry.backend = match backend {
                BackendArg::Auto => RegistryBackend::Auto,
                BackendArg::Snapshot => RegistryBackend::Snapshot,
            };
        }
        if let Some(path) = &self.snapshot {
            config.registry.snapshot_path = Some(path.clone());
            // A snapshot path alone implies the snapshot backend
            if self.backend.is_none() {
                config.registry.backend = RegistryBackend::Snapshot;
            }
        }
        if let Some(policy) = self.label_policy {
            config.query.label_policy = match policy {
                LabelPolicyArg::Strict => LabelPolicy::Strict,
                LabelPolicyArg::Fallback => LabelPolicy::PackageNameFallback,
                LabelPolicyArg::Skip => LabelPolicy::Skip,
            };
        }
        if let Some(sort) = self.sort {
            config.query.sort_order = match sort {
                SortArg::Registry => SortOrder::Registry,
                SortArg::Name => SortOrder::AppName,
            };
        }
        if self.timeout_ms.is_some() {
            config.query.timeout_ms = self.timeout_ms;
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(ConfigManager::get_config_path);

    match cli.command {
        Command::Config(ConfigCommand::Init) => {
            ConfigManager::save_to(&config_path, &ListerConfig::default())
                .context("Failed to write default configuration")?;
            println!("{}", config_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(ConfigCommand::Show) => {
            let config = ConfigManager::load_from(&config_path)
                .context("Failed to load configuration")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::List(args) => run_list(&config_path, &args),
    }
}

fn run_list(config_path: &Path, args: &ListArgs) -> Result<ExitCode> {
    // Logging is configured from this file, so a parse failure is only reported
    // once the subscriber is installed
    let (mut config, config_error) = match ConfigManager::try_load_from(config_path) {
        Ok(config) => (config, None),
        Err(AppListerError::JsonError(e)) => (ListerConfig::default(), Some(e)),
        Err(e) => return Err(e).context("Failed to load configuration"),
    };
    args.apply(&mut config);

    utils::init_logging(&config.logging).context("Failed to initialize logging system")?;
    info!("installed-apps v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        warn!(
            "Ignoring corrupt configuration {}, using defaults: {}",
            config_path.display(),
            e
        );
    }

    let result = platform_registry(&config.registry)
        .map_err(|e| {
            error!("Failed to open package registry: {}", e);
            AppListerError::QueryError(e)
        })
        .and_then(|registry| {
            let lister =
                InstalledApplicationLister::new(registry).with_options(config.query.to_options());
            query_with_deadline(&lister)
        });

    if let Some(hint) = rejection_hint(&result) {
        eprintln!("{hint}");
    }
    let response = BridgeResponse::from(result);
    println!("{}", response.to_json(args.pretty)?);

    if response.is_resolved() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Human-readable explanation of a rejected query, for stderr
fn rejection_hint(
    result: &installed_apps::Result<Vec<InstalledApplicationRecord>>,
) -> Option<String> {
    result.as_ref().err().map(get_user_friendly_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use installed_apps::RegistryError;
    use std::time::Duration;

    fn list_args(argv: &[&str]) -> ListArgs {
        let cli = Cli::try_parse_from(argv.iter().copied()).unwrap();
        match cli.command {
            Command::List(args) => args,
            Command::Config(_) => panic!("expected the list subcommand"),
        }
    }

    #[test]
    fn test_flags_override_configuration() {
        let mut config = ListerConfig::default();
        config.query.timeout_ms = Some(5_000);

        list_args(&[
            "installed-apps",
            "list",
            "--label-policy",
            "skip",
            "--sort",
            "name",
            "--timeout-ms",
            "250",
        ])
        .apply(&mut config);

        assert_eq!(config.query.label_policy, LabelPolicy::Skip);
        assert_eq!(config.query.sort_order, SortOrder::AppName);
        assert_eq!(config.query.timeout_ms, Some(250));
        assert_eq!(config.registry.backend, RegistryBackend::Auto);
    }

    #[test]
    fn test_absent_flags_keep_configuration() {
        let mut config = ListerConfig::default();
        config.query.label_policy = LabelPolicy::PackageNameFallback;
        config.query.timeout_ms = Some(5_000);
        let expected = config.clone();

        list_args(&["installed-apps", "list", "--pretty"]).apply(&mut config);
        assert_eq!(config, expected);
    }

    #[test]
    fn test_snapshot_flag_selects_snapshot_backend() {
        let mut config = ListerConfig::default();
        list_args(&["installed-apps", "list", "--snapshot", "device.json"]).apply(&mut config);

        assert_eq!(config.registry.backend, RegistryBackend::Snapshot);
        assert_eq!(config.registry.snapshot_path, Some(PathBuf::from("device.json")));
    }

    #[test]
    fn test_explicit_backend_wins_over_snapshot_flag() {
        let mut config = ListerConfig::default();
        list_args(&[
            "installed-apps",
            "list",
            "--backend",
            "auto",
            "--snapshot",
            "device.json",
        ])
        .apply(&mut config);

        assert_eq!(config.registry.backend, RegistryBackend::Auto);
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["installed-apps", "list", "--config", "alt.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.json")));
    }

    #[test]
    fn test_every_rejection_has_hint() {
        let denied: installed_apps::Result<Vec<InstalledApplicationRecord>> = Err(
            RegistryError::PermissionDenied("Permission denial".to_string()).into(),
        );
        assert!(rejection_hint(&denied).unwrap().contains("QUERY_ALL_PACKAGES"));

        let timed_out: installed_apps::Result<Vec<InstalledApplicationRecord>> =
            Err(AppListerError::Timeout(Duration::from_millis(250)));
        assert!(rejection_hint(&timed_out).unwrap().contains("250 ms"));

        assert!(rejection_hint(&Ok(Vec::new())).is_none());
    }
}
