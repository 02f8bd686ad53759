use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::HttpContractServices;
use crate::config::PlotContractConfig;
use crate::types::SelectedFile;
use crate::upload::{UploadEvent, UploadSurface};
use crate::workflow::{ContractServices, Orchestrator};
use statig::prelude::*;

pub mod check;
pub mod extract;
pub mod session;
pub mod show_config;

pub use check::CheckCommand;
pub use extract::ExtractCommand;
pub use session::SessionCommand;
pub use show_config::ShowConfigCommand;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Build an orchestrator wired to the configured HTTP services
pub fn connect(config: &PlotContractConfig) -> Result<Orchestrator<HttpContractServices>> {
    let services = HttpContractServices::new(&config.api).context("Failed to build HTTP client")?;
    Ok(Orchestrator::new(Arc::new(services), config.eligibility.clone()))
}

/// Upload surface whose selections arrive on a channel
pub struct Picker {
    surface: StateMachine<UploadSurface>,
    selected: mpsc::UnboundedReceiver<SelectedFile>,
}

impl Default for Picker {
    fn default() -> Self {
        Self::new()
    }
}

impl Picker {
    pub fn new() -> Self {
        let (tx, selected) = mpsc::unbounded_channel();
        let surface = UploadSurface::new(move |file| {
            let _ = tx.send(file);
        });
        Self {
            surface: surface.state_machine(),
            selected,
        }
    }

    /// Feed an interaction to the surface and return the file it selected, if any
    pub fn handle(&mut self, event: UploadEvent) -> Option<SelectedFile> {
        self.surface.handle(&event);
        let mut picked = None;
        while let Ok(file) = self.selected.try_recv() {
            picked = Some(file);
        }
        picked
    }
}

pub async fn read_files(paths: &[PathBuf]) -> Result<Vec<SelectedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_file(path).await?);
    }
    Ok(files)
}

pub async fn read_file(path: &Path) -> Result<SelectedFile> {
    SelectedFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Pick a file through the upload surface and start extraction
pub async fn submit_file<S: ContractServices + 'static>(orch: &mut Orchestrator<S>, path: &Path) -> Result<()> {
    let file = read_file(path).await?;
    let mut picker = Picker::new();
    if let Some(file) = picker.handle(UploadEvent::PickerChange { files: vec![file] }) {
        orch.select_file(file)?;
    }
    Ok(())
}

pub fn show_how_to_get_started() -> Result<()> {
    println!("🪦 Plot Contract - 墓地契約書管理システム");
    println!();
    println!("To get started:");
    println!("  📄 plot-contract extract <FILE>              # Read a scanned contract");
    println!("  🧾 plot-contract check <FILE> -r third_party  # Extract, then check inheritance");
    println!("  💬 plot-contract session [FILE]              # Interactive workflow");
    println!("  ⚙️  plot-contract config                      # Show effective configuration");
    println!();
    println!("💡 Heir relationships: spouse, child, third_party");
    Ok(())
}
