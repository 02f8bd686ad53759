use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::cli::commands::{connect, submit_file, Command};
use crate::config::PlotContractConfig;
use crate::error::{ELIGIBILITY_FAILED_MESSAGE, EXTRACTION_FAILED_MESSAGE};
use crate::types::HeirRelationship;
use crate::view::{CHECKING_NOTICE, EXTRACTING_NOTICE};
use crate::workflow::Phase;

/// Extract a contract, then ask which documents the heir needs
pub struct CheckCommand {
    pub file: PathBuf,
    pub relationship: HeirRelationship,
    pub config: PlotContractConfig,
}

impl CheckCommand {
    pub fn new(file: PathBuf, relationship: HeirRelationship, config: PlotContractConfig) -> Self {
        Self {
            file,
            relationship,
            config,
        }
    }
}

impl Command for CheckCommand {
    async fn execute(&self) -> Result<()> {
        let mut orch = connect(&self.config)?;

        println!("📄 {}", self.file.display());
        submit_file(&mut orch, &self.file).await?;
        println!("⏳ {EXTRACTING_NOTICE}");
        if orch.settle().await != Phase::Extracted {
            let message = orch
                .view()
                .extraction_error
                .unwrap_or_else(|| EXTRACTION_FAILED_MESSAGE.to_string());
            bail!("❌ {message}");
        }
        if let Some(contract) = orch.view().contract {
            println!();
            println!("{contract}");
        }

        orch.set_relationship(self.relationship)?;
        orch.request_check()?;
        println!();
        println!("🧾 {} ... {CHECKING_NOTICE}", self.relationship.label());

        let phase = orch.settle().await;
        let alerts = orch.take_alerts();
        match (phase, orch.view().checklist) {
            (Phase::Checked, Some(checklist)) => {
                println!();
                println!("{checklist}");
                Ok(())
            }
            _ => {
                let message = alerts
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| ELIGIBILITY_FAILED_MESSAGE.to_string());
                bail!("❌ {message}")
            }
        }
    }
}
