//! Config command
//!
//! Manage chemscreen configuration.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::fs;
use std::path::Path;

use chemscreen_core::config::Config;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(path, json),
        ConfigCommand::Init { force } => init_config(path, force),
        ConfigCommand::Validate => validate_config(path),
    }
}

fn show_config(path: &Path, as_json: bool) -> Result<()> {
    let config = Config::load_or_default(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if path.exists() {
        println!("{}", path.display().to_string().dimmed());
    } else {
        println!("{}", "(defaults, no config file)".dimmed());
    }
    println!();
    println!("{}", config.to_toml_string()?);

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let content = format!("# chemscreen configuration\n\n{}", Config::default().to_toml_string()?);
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} Wrote default configuration to {}", "✓".green(), path.display());
    Ok(())
}

fn validate_config(path: &Path) -> Result<()> {
    if !path.exists() {
        eprintln!(
            "{} Configuration not found at {}; defaults apply",
            "⚠".yellow(),
            path.display()
        );
        return Ok(());
    }

    match Config::load(path) {
        Ok(_) => {
            println!("{} Configuration is valid", "✓".green());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            bail!("invalid configuration")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_validate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        init_config(&path, false).unwrap();
        assert!(path.exists());
        validate_config(&path).unwrap();

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[export]\ndefault_format = \"pdf\"\n").unwrap();
        assert!(validate_config(&path).is_err());
    }
}
