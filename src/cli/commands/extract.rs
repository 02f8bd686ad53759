use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::cli::commands::{connect, submit_file, Command};
use crate::config::PlotContractConfig;
use crate::error::EXTRACTION_FAILED_MESSAGE;
use crate::view::EXTRACTING_NOTICE;
use crate::workflow::Phase;

pub struct ExtractCommand {
    pub file: PathBuf,
    pub config: PlotContractConfig,
}

impl ExtractCommand {
    pub fn new(file: PathBuf, config: PlotContractConfig) -> Self {
        Self { file, config }
    }
}

impl Command for ExtractCommand {
    async fn execute(&self) -> Result<()> {
        let mut orch = connect(&self.config)?;

        println!("📄 {}", self.file.display());
        submit_file(&mut orch, &self.file).await?;
        println!("⏳ {EXTRACTING_NOTICE}");

        let phase = orch.settle().await;
        let view = orch.view();
        match (phase, view.contract) {
            (Phase::Extracted, Some(contract)) => {
                println!();
                println!("{contract}");
                Ok(())
            }
            _ => {
                let message = view.extraction_error.unwrap_or_else(|| EXTRACTION_FAILED_MESSAGE.to_string());
                bail!("❌ {message}")
            }
        }
    }
}
