//! CLI definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::{CURSEFORGE_API_KEY_VAR, DEFAULT_CONFIG_FILE, DEFAULT_MAPPINGS_FILE};
use crate::core::downloader::DEFAULT_CACHE_FILE;
use crate::core::report::{COMPATIBILITY_FILE, UPDATES_FILE};

/// Keep a Fabric Minecraft server, its loader and its mods on one
/// compatible upgrade path.
#[derive(Parser, Debug)]
#[command(
    name = "mcserver-updater",
    version,
    about = "Update checks, compatibility search and downloads for a modded Minecraft server",
    after_help = "Examples:\n    \
                  mcserver-updater validate --auto-fix\n    \
                  mcserver-updater check --full-check\n    \
                  mcserver-updater check --full-check --save-plan upgrade.json\n    \
                  mcserver-updater check --loader --mc-version 1.21.3\n    \
                  mcserver-updater download --rebuild-cache"
)]
pub struct Cli {
    /// Server configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Source mappings file (endpoints, target directories, project aliases)
    #[arg(long, global = true, default_value = DEFAULT_MAPPINGS_FILE)]
    pub mappings: PathBuf,

    /// CurseForge API key
    #[arg(long, global = true, env = CURSEFORGE_API_KEY_VAR, hide_env_values = true)]
    pub curseforge_api_key: Option<String>,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check for newer Minecraft, loader and mod versions
    Check(CheckArgs),

    /// Download the server jar, loader and mods declared in the config
    Download(DownloadArgs),

    /// Validate the config and fill in missing mod details
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Check only Minecraft server updates
    #[arg(long)]
    pub mc: bool,

    /// Check only loader updates
    #[arg(long, alias = "fabric")]
    pub loader: bool,

    /// Check only mod updates
    #[arg(long)]
    pub mods: bool,

    /// Check loader/mod updates against this Minecraft version instead of the configured one
    #[arg(long, value_name = "VERSION")]
    pub mc_version: Option<String>,

    /// Output file for update information
    #[arg(long, default_value = UPDATES_FILE)]
    pub output: PathBuf,

    /// Search for the newest Minecraft + loader pair every mod supports
    #[arg(long)]
    pub full_check: bool,

    /// Output file for the compatibility report
    #[arg(long, default_value = COMPATIBILITY_FILE)]
    pub compat_output: PathBuf,

    /// With --full-check, save the download plan for the found target as a
    /// plan cache that `download --cache-file` can replay
    #[arg(long, value_name = "FILE", requires = "full_check")]
    pub save_plan: Option<PathBuf>,
}

impl CheckArgs {
    /// No axis flag means every axis.
    pub fn check_all(&self) -> bool {
        !(self.mc || self.loader || self.mods)
    }
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Rebuild the download plan from config instead of replaying the cache
    #[arg(long)]
    pub rebuild_cache: bool,

    /// Path to the plan cache
    #[arg(long, default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Replace versions that do not exist with the latest compatible one
    #[arg(long)]
    pub auto_fix: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_defaults_to_all_axes() {
        let cli = Cli::try_parse_from(["mcserver-updater", "check"]).unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert!(args.check_all());
                assert!(!args.full_check);
                assert_eq!(args.output, PathBuf::from("updates.json"));
                assert_eq!(args.compat_output, PathBuf::from("compatibility_report.json"));
            }
            _ => panic!("Expected Check command"),
        }
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
    }

    #[test]
    fn fabric_flag_is_an_alias_for_loader() {
        let cli = Cli::try_parse_from(["mcserver-updater", "check", "--fabric", "--mc-version", "1.21.3"]).unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert!(args.loader);
                assert!(!args.check_all());
                assert_eq!(args.mc_version.as_deref(), Some("1.21.3"));
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mcserver-updater",
            "download",
            "--rebuild-cache",
            "--config",
            "srv/config.yaml",
            "-q",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.config, PathBuf::from("srv/config.yaml"));
        match cli.command {
            Commands::Download(args) => {
                assert!(args.rebuild_cache);
                assert_eq!(args.cache_file, PathBuf::from(".download_cache.json"));
            }
            _ => panic!("Expected Download command"),
        }
    }

    #[test]
    fn save_plan_needs_full_check() {
        assert!(Cli::try_parse_from(["mcserver-updater", "check", "--save-plan", "upgrade.json"]).is_err());

        let cli = Cli::try_parse_from([
            "mcserver-updater",
            "check",
            "--full-check",
            "--save-plan",
            "upgrade.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert!(args.full_check);
                assert_eq!(args.save_plan, Some(PathBuf::from("upgrade.json")));
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn validate_auto_fix_flag() {
        let cli = Cli::try_parse_from(["mcserver-updater", "validate", "--auto-fix"]).unwrap();
        assert!(matches!(cli.command, Commands::Validate(ValidateArgs { auto_fix: true })));
    }
}
