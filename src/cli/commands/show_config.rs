use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::commands::Command;
use crate::config::PlotContractConfig;

pub struct ShowConfigCommand {
    pub config: PlotContractConfig,
    pub write: Option<PathBuf>,
}

impl ShowConfigCommand {
    pub fn new(config: PlotContractConfig, write: Option<PathBuf>) -> Self {
        Self { config, write }
    }
}

impl Command for ShowConfigCommand {
    async fn execute(&self) -> Result<()> {
        print!("{}", self.config.to_toml()?);
        if let Some(path) = &self.write {
            self.config
                .save_to_file(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!();
            println!("💾 Saved configuration to {}", path.display());
        }
        Ok(())
    }
}
