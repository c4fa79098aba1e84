//! strand-soak - hammer a pipeline state tracker and report what a reader saw
//!
//! ## Usage
//!
//! - `strand-soak [CONFIG]`: run a soak with the given YAML config
//!   (default: `<config dir>/strand/soak.yaml`, built-in defaults if missing)
//! - `strand-soak [CONFIG] --write-default`: write the default config and exit
//!   (flag and path may come in either order)
//!
//! The report is printed to stdout as YAML. Set RUST_LOG=debug to log every
//! state transition.

use std::path::PathBuf;

use anyhow::{Context, Result};
use strand_core::bench::BenchProfile;
use strand_core::config::{
    default_config_path, load_config, save_config, SoakConfig, SOAK_CONFIG_FILE,
};
use strand_core::soak::run_soak;

/// Parsed command line
#[derive(Debug, PartialEq)]
struct CliArgs {
    config_path: PathBuf,
    write_default: bool,
}

impl CliArgs {
    /// Parse arguments (without the program name)
    ///
    /// The first non-flag argument is the config path; unknown flags are ignored.
    fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config_path = None;
        let mut write_default = false;

        for arg in args {
            if arg == "--write-default" {
                write_default = true;
            } else if arg.starts_with("--") {
                log::warn!("Ignoring unknown flag {}", arg);
            } else if config_path.is_none() {
                config_path = Some(PathBuf::from(arg));
            }
        }

        Self {
            config_path: config_path.unwrap_or_else(|| default_config_path(SOAK_CONFIG_FILE)),
            write_default,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = CliArgs::parse(std::env::args().skip(1));

    if args.write_default {
        save_config(&SoakConfig::default(), &args.config_path)?;
        return Ok(());
    }

    log::info!("strand-soak starting ({} bench profile)", BenchProfile::current().name());

    let config: SoakConfig = load_config(&args.config_path);
    let report = run_soak(&config).context("Soak run failed")?;

    let yaml = serde_yaml::to_string(&report).context("Failed to serialize soak report")?;
    print!("{}", yaml);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_uses_default_path() {
        let parsed = CliArgs::parse(args(&[]));
        assert_eq!(parsed.config_path, default_config_path(SOAK_CONFIG_FILE));
        assert!(!parsed.write_default);
    }

    #[test]
    fn test_write_default_in_either_position() {
        let expected = CliArgs {
            config_path: PathBuf::from("/tmp/soak.yaml"),
            write_default: true,
        };
        assert_eq!(CliArgs::parse(args(&["--write-default", "/tmp/soak.yaml"])), expected);
        assert_eq!(CliArgs::parse(args(&["/tmp/soak.yaml", "--write-default"])), expected);
    }

    #[test]
    fn test_write_default_without_path() {
        let parsed = CliArgs::parse(args(&["--write-default"]));
        assert!(parsed.write_default);
        assert_eq!(parsed.config_path, default_config_path(SOAK_CONFIG_FILE));
    }

    #[test]
    fn test_first_path_wins_and_unknown_flags_ignored() {
        let parsed = CliArgs::parse(args(&["--verbose", "a.yaml", "b.yaml"]));
        assert_eq!(parsed.config_path, PathBuf::from("a.yaml"));
        assert!(!parsed.write_default);
    }
}
