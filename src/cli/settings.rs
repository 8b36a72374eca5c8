//! Settings subcommand implementation.

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use crate::output;
use clap::Parser;
use console::style;
use std::path::PathBuf;

/// Show or reset stored defaults.
#[derive(Parser, Debug)]
pub struct SettingsCommand {
    /// Write the default settings to disk
    #[arg(long)]
    pub reset: bool,
}

impl SettingsCommand {
    /// Execute the settings command.
    ///
    /// `file` overrides the default settings location.
    pub fn execute(&self, settings: &AppSettings, file: Option<PathBuf>) -> CliResult<()> {
        let path = match file {
            Some(path) => path,
            None => Paths::resolve()?.settings_file(),
        };

        if self.reset {
            AppSettings::default().save_to(&path)?;
            output::print_success(&format!("Default settings written to {}", path.display()));
            return Ok(());
        }

        println!("{} {}", style("Settings file:").bold(), path.display());
        if !path.exists() {
            println!("  {}", style("(not present, using defaults)").dim());
        }
        println!("  {:<22} {}", "default_start", settings.default_start);
        println!("  {:<22} {}", "default_end", settings.default_end);
        println!("  {:<22} {}", "default_ports", settings.default_ports);
        println!("  {:<22} {}", "default_timeout_secs", settings.default_timeout_secs);
        println!("  {:<22} {}", "max_concurrency", settings.max_concurrency);
        println!("  {:<22} {}", "default_output_format", settings.default_output_format);
        Ok(())
    }
}
