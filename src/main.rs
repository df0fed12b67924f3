//! imgexport - inspect image export rules
//!
//! Loads the persisted settings from the config directory, compiles the auto
//! export rules and answers questions about them:
//!
//! - `init`: write a default `settings.yaml` if none exists
//! - `match <PATH>...`: list the rules (and destinations) selecting each vault path
//! - `format <EXT>...`: report whether an extension appears in the export menu
//!
//! Paths ending in `/` are treated as folders.

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use imgexport::{APP_NAME, ConfigManager, SettingsManager, VERSION, VaultEntry};

#[derive(Parser, Debug)]
#[command(name = "imgexport")]
#[command(about = "Inspect image export rules", long_about = None, version)]
struct Args {
    /// Directory holding settings.yaml
    #[arg(short = 'c', long, default_value = "imgexport-data")]
    config_dir: Utf8PathBuf,

    /// Directory for rotating log files
    #[arg(long, default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Debug logging, also mirrored to stderr
    #[arg(short = 'd', long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write default settings if the settings file does not exist
    Init,

    /// Show which auto export rules select each vault path
    Match {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Check whether extensions can be exported from the file menu
    Format {
        #[arg(required = true)]
        extensions: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard =
        imgexport::logging::setup_logging(&args.log_dir, APP_NAME, args.debug, args.debug)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&args.config_dir)?;

    match args.command {
        Command::Init => {
            if config_manager.init_settings()? {
                println!("Wrote default settings to {}", config_manager.settings_path());
            } else {
                println!("{} already exists", config_manager.settings_path());
            }
        }
        Command::Match { paths } => {
            let settings = SettingsManager::new(config_manager.load_settings()?);
            for path in paths {
                let entry = match path.strip_suffix('/') {
                    Some(folder) => VaultEntry::directory(folder),
                    None => VaultEntry::file(path.as_str(), 0),
                };

                let matches = settings.find_runtime_auto_exports(&entry);
                if matches.is_empty() {
                    println!("{path}: no matching rules");
                    continue;
                }

                println!("{path}:");
                if let Some(file) = entry.as_file() {
                    for runtime in matches {
                        println!(
                            "  {} -> {}",
                            runtime.name(),
                            runtime.settings.export_destination(file)
                        );
                    }
                }
            }
        }
        Command::Format { extensions } => {
            let settings = SettingsManager::new(config_manager.load_settings()?);
            for ext in extensions {
                let ext = ext.trim_start_matches('.');
                let supported = settings.is_export_supported_format(Some(ext));
                println!("{ext}: {}", if supported { "supported" } else { "not supported" });
            }
        }
    }

    tracing::info!("Done");
    Ok(())
}
