use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::commands::{connect, read_files, submit_file, Command, Picker};
use crate::config::PlotContractConfig;
use crate::error::TransitionError;
use crate::types::{HeirRelationship, SelectedFile};
use crate::upload::{UploadEvent, ACCEPT_HINT};
use crate::workflow::{ContractServices, Orchestrator, Phase};

/// Interactive workflow driven from stdin
pub struct SessionCommand {
    pub file: Option<PathBuf>,
    pub config: PlotContractConfig,
}

impl SessionCommand {
    pub fn new(file: Option<PathBuf>, config: PlotContractConfig) -> Self {
        Self { file, config }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

impl Command for SessionCommand {
    async fn execute(&self) -> Result<()> {
        let mut orch = connect(&self.config)?;
        let mut picker = Picker::new();

        println!("🪦 Plot Contract session (type 'help' for commands)");
        println!("📎 Accepts: {ACCEPT_HINT}");
        println!();

        if let Some(path) = &self.file {
            submit_file(&mut orch, path).await?;
        }
        render(&mut orch);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read stdin")? else {
                        break;
                    };
                    match run_line(&mut orch, &mut picker, line.trim()).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => println!("❌ {e:#}"),
                    }
                }
                Some(outcome) = orch.next_completion(), if orch.pending_requests() > 0 => {
                    match outcome {
                        Ok(_) => render(&mut orch),
                        Err(e) if e.is_superseded() => {}
                        Err(e) => println!("⚠️  {e}"),
                    }
                }
            }
        }

        if orch.state().is_busy() {
            orch.cancel()?;
        }
        println!("👋 Bye");
        Ok(())
    }
}

async fn run_line<S: ContractServices + 'static>(
    orch: &mut Orchestrator<S>,
    picker: &mut Picker,
    line: &str,
) -> Result<Flow> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Flow::Continue);
    };
    let args: Vec<&str> = words.collect();

    match command {
        "upload" => {
            let Some(path) = args.first() else {
                println!("Usage: upload <FILE>");
                return Ok(Flow::Continue);
            };
            let files = read_files(&[PathBuf::from(path)]).await?;
            select(orch, picker.handle(UploadEvent::PickerChange { files }))?;
        }
        "drop" => {
            if args.is_empty() {
                println!("Usage: drop <FILE>...");
                return Ok(Flow::Continue);
            }
            let paths: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
            let files = read_files(&paths).await?;
            picker.handle(UploadEvent::DragEnter);
            select(orch, picker.handle(UploadEvent::Drop { files }))?;
        }
        "rel" | "relationship" => {
            let Some(value) = args.first() else {
                println!("Usage: rel <spouse|child|third_party>");
                return Ok(Flow::Continue);
            };
            let relationship: HeirRelationship = value.parse()?;
            orch.set_relationship(relationship)?;
            render(orch);
        }
        "check" => {
            orch.request_check()?;
            render(orch);
        }
        "reset" => {
            orch.reset_checklist()?;
            render(orch);
        }
        "cancel" => {
            orch.cancel()?;
            render(orch);
        }
        "show" => render(orch),
        "state" => println!("{}", serde_json::to_string_pretty(orch.state())?),
        "help" => print_help(),
        "quit" | "exit" => return Ok(Flow::Quit),
        other => println!("❓ Unknown command '{other}' (type 'help')"),
    }
    Ok(Flow::Continue)
}

fn select<S: ContractServices + 'static>(
    orch: &mut Orchestrator<S>,
    file: Option<SelectedFile>,
) -> Result<Phase, TransitionError> {
    match file {
        Some(file) => {
            let phase = orch.select_file(file)?;
            render(orch);
            Ok(phase)
        }
        None => Ok(orch.phase()),
    }
}

fn render<S: ContractServices + 'static>(orch: &mut Orchestrator<S>) {
    for alert in orch.take_alerts() {
        println!("🚨 {alert}");
    }
    println!("── {} ──", orch.phase());
    print!("{}", orch.view());
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  upload <FILE>        Pick a contract scan");
    println!("  drop <FILE>...       Drop files onto the upload area (first one is used)");
    println!("  rel <RELATIONSHIP>   spouse, child or third_party");
    println!("  check                Run the inheritance check");
    println!("  reset                Clear the checklist and choose again");
    println!("  cancel               Abandon in-flight requests and start over");
    println!("  show                 Print the current screen");
    println!("  state                Dump the workflow state as JSON");
    println!("  quit                 Leave the session");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EligibilityConfig;
    use crate::types::{ContractData, InheritanceChecklist};
    use crate::workflow::mocks::ScriptedServices;
    use std::path::Path;
    use std::sync::Arc;

    fn write_scan(dir: &Path, name: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, b"scan").unwrap();
        path.display().to_string()
    }

    fn contract() -> ContractData {
        ContractData {
            contract_holder: "山田太郎".to_string(),
            plot_number: "A-12".to_string(),
            ..ContractData::default()
        }
    }

    fn session() -> (Arc<ScriptedServices>, Orchestrator<ScriptedServices>, Picker) {
        let services = Arc::new(ScriptedServices::new());
        let orch = Orchestrator::new(Arc::clone(&services), EligibilityConfig::default());
        (services, orch, Picker::new())
    }

    #[tokio::test]
    async fn test_session_commands_drive_full_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let scan = write_scan(dir.path(), "contract.pdf");
        let (services, mut orch, mut picker) = session();
        let extraction = services.script_extraction("contract.pdf");

        let flow = run_line(&mut orch, &mut picker, &format!("upload {scan}")).await.unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(orch.phase(), Phase::Extracting);
        extraction.send(Ok(contract())).unwrap();
        assert_eq!(orch.settle().await, Phase::Extracted);

        run_line(&mut orch, &mut picker, "rel third_party").await.unwrap();
        assert_eq!(orch.state().relationship, HeirRelationship::ThirdParty);

        let check = services.script_check();
        run_line(&mut orch, &mut picker, "check").await.unwrap();
        assert_eq!(orch.phase(), Phase::Checking);
        check
            .send(Ok(InheritanceChecklist {
                required_documents: vec!["同意書".to_string()],
                can_transfer: false,
                notes: String::new(),
            }))
            .unwrap();
        assert_eq!(orch.settle().await, Phase::Checked);
        assert_eq!(services.check_requests()[0].heir_relationship, HeirRelationship::ThirdParty);

        run_line(&mut orch, &mut picker, "reset").await.unwrap();
        assert_eq!(orch.phase(), Phase::Extracted);
        assert_eq!(orch.state().relationship, HeirRelationship::ThirdParty);

        run_line(&mut orch, &mut picker, "cancel").await.unwrap();
        assert_eq!(orch.phase(), Phase::Idle);
        assert!(orch.state().contract.is_none());

        let flow = run_line(&mut orch, &mut picker, "quit").await.unwrap();
        assert_eq!(flow, Flow::Quit);
    }

    #[tokio::test]
    async fn test_drop_uses_first_file_only() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_scan(dir.path(), "first.png");
        let second = write_scan(dir.path(), "second.png");
        let (services, mut orch, mut picker) = session();
        let extraction = services.script_extraction("first.png");

        run_line(&mut orch, &mut picker, &format!("drop {first} {second}"))
            .await
            .unwrap();
        assert_eq!(orch.state().file.as_ref().unwrap().name, "first.png");

        extraction.send(Ok(contract())).unwrap();
        assert_eq!(orch.settle().await, Phase::Extracted);
        assert_eq!(services.uploaded_files(), vec!["first.png".to_string()]);
    }

    #[tokio::test]
    async fn test_rejected_commands_report_errors_and_keep_state() {
        let (_services, mut orch, mut picker) = session();

        assert!(run_line(&mut orch, &mut picker, "check").await.is_err());
        assert!(run_line(&mut orch, &mut picker, "reset").await.is_err());
        assert!(run_line(&mut orch, &mut picker, "cancel").await.is_err());
        assert!(run_line(&mut orch, &mut picker, "rel cousin").await.is_err());
        assert!(run_line(&mut orch, &mut picker, "upload /no/such/contract.pdf")
            .await
            .is_err());
        assert_eq!(orch.phase(), Phase::Idle);
        assert_eq!(orch.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_blank_and_unknown_lines_continue() {
        let (_services, mut orch, mut picker) = session();

        assert_eq!(run_line(&mut orch, &mut picker, "").await.unwrap(), Flow::Continue);
        assert_eq!(run_line(&mut orch, &mut picker, "dance").await.unwrap(), Flow::Continue);
        assert_eq!(run_line(&mut orch, &mut picker, "upload").await.unwrap(), Flow::Continue);
        assert_eq!(run_line(&mut orch, &mut picker, "exit").await.unwrap(), Flow::Quit);
    }
}
