use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument};

use crate::config::{EligibilityBasis, EligibilityConfig};
use crate::error::TransitionError;
use crate::telemetry::{create_request_span, generate_correlation_id};
use crate::types::{ContractData, EligibilityRequest, HeirRelationship, SelectedFile};
use crate::view::WorkflowView;
use crate::workflow::state_machine::{transition, Effect, Phase, WorkflowEvent, WorkflowState};
use crate::workflow::traits::ContractServices;

/// Drives the workflow state machine against the remote services
///
/// The orchestrator is the only writer of [`WorkflowState`]. Remote calls run
/// as spawned tasks that report back through a channel; their results are
/// applied one at a time by [`Orchestrator::next_completion`], where stale
/// generations are dropped.
pub struct Orchestrator<S: ContractServices + 'static> {
    state: WorkflowState,
    services: Arc<S>,
    eligibility: EligibilityConfig,
    completions_tx: mpsc::UnboundedSender<WorkflowEvent>,
    completions_rx: mpsc::UnboundedReceiver<WorkflowEvent>,
    pending: usize,
    alerts: Vec<String>,
}

impl<S: ContractServices + 'static> Orchestrator<S> {
    pub fn new(services: Arc<S>, eligibility: EligibilityConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state: WorkflowState::new(),
            services,
            eligibility,
            completions_tx,
            completions_rx,
            pending: 0,
            alerts: Vec::new(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn view(&self) -> WorkflowView {
        WorkflowView::from_state(&self.state)
    }

    /// Number of spawned requests whose completion has not been received yet
    pub fn pending_requests(&self) -> usize {
        self.pending
    }

    /// Drain alert-level notifications raised since the last call
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn select_file(&mut self, file: SelectedFile) -> Result<Phase, TransitionError> {
        self.dispatch(WorkflowEvent::FileSelected { file })
    }

    pub fn set_relationship(&mut self, relationship: HeirRelationship) -> Result<Phase, TransitionError> {
        self.dispatch(WorkflowEvent::RelationshipChanged { relationship })
    }

    pub fn request_check(&mut self) -> Result<Phase, TransitionError> {
        self.dispatch(WorkflowEvent::CheckRequested)
    }

    pub fn reset_checklist(&mut self) -> Result<Phase, TransitionError> {
        self.dispatch(WorkflowEvent::ResetChecklist)
    }

    pub fn cancel(&mut self) -> Result<Phase, TransitionError> {
        self.dispatch(WorkflowEvent::Cancel)
    }

    /// Apply one event and run the effects it produces
    pub fn dispatch(&mut self, event: WorkflowEvent) -> Result<Phase, TransitionError> {
        let name = event.name();
        let from = self.state.phase();
        match transition(&self.state, event) {
            Ok(step) => {
                self.state = step.state;
                info!(event = name, from = %from, to = %self.state.phase(), "Workflow transition");
                for effect in step.effects {
                    self.run_effect(effect);
                }
                Ok(self.state.phase())
            }
            Err(e) if e.is_superseded() => {
                debug!(event = name, error = %e, "Dropping stale response");
                Err(e)
            }
            Err(e) => {
                warn!(event = name, phase = %from, "Event rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Wait for the next remote completion and apply it
    ///
    /// Returns `None` when no request is outstanding.
    pub async fn next_completion(&mut self) -> Option<Result<Phase, TransitionError>> {
        if self.pending == 0 {
            return None;
        }
        let event = self.completions_rx.recv().await?;
        self.pending -= 1;
        Some(self.dispatch(event))
    }

    /// Apply completions until the current requests have resolved
    ///
    /// Stale completions that arrive meanwhile are dropped.
    pub async fn settle(&mut self) -> Phase {
        while self.state.is_busy() {
            if self.next_completion().await.is_none() {
                break;
            }
        }
        self.state.phase()
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Extract { generation, file } => {
                let services = Arc::clone(&self.services);
                let tx = self.completions_tx.clone();
                let correlation_id = generate_correlation_id();
                let span = create_request_span("extract", &correlation_id, generation);
                self.pending += 1;
                tokio::spawn(
                    async move {
                        info!(file = %file.name, mime = %file.mime, size = file.size, "Uploading contract for extraction");
                        let event = match services.extract(&file).await {
                            Ok(contract) => WorkflowEvent::ExtractionSucceeded { generation, contract },
                            Err(e) => {
                                warn!(status = ?e.status(), "Extraction failed: {}", e);
                                WorkflowEvent::ExtractionFailed {
                                    generation,
                                    reason: e.to_string(),
                                }
                            }
                        };
                        // The receiver only goes away with the orchestrator
                        let _ = tx.send(event);
                    }
                    .instrument(span),
                );
            }
            Effect::CheckEligibility {
                generation,
                relationship,
                contract,
            } => {
                let request = eligibility_request(&self.eligibility, relationship, contract);
                let services = Arc::clone(&self.services);
                let tx = self.completions_tx.clone();
                let correlation_id = generate_correlation_id();
                let span = create_request_span("check_eligibility", &correlation_id, generation);
                self.pending += 1;
                tokio::spawn(
                    async move {
                        info!(relationship = %request.heir_relationship, "Requesting eligibility check");
                        let event = match services.check_eligibility(&request).await {
                            Ok(checklist) => WorkflowEvent::CheckSucceeded { generation, checklist },
                            Err(e) => {
                                warn!(status = ?e.status(), "Eligibility check failed: {}", e);
                                WorkflowEvent::CheckFailed {
                                    generation,
                                    reason: e.to_string(),
                                }
                            }
                        };
                        let _ = tx.send(event);
                    }
                    .instrument(span),
                );
            }
            Effect::Alert { message } => {
                warn!(alert = %message, "Alert raised");
                self.alerts.push(message);
            }
        }
    }
}

/// Build the eligibility request body for the configured basis
pub fn eligibility_request(
    config: &EligibilityConfig,
    relationship: HeirRelationship,
    contract: ContractData,
) -> EligibilityRequest {
    EligibilityRequest {
        contract_id: config.contract_id,
        heir_relationship: relationship,
        contract: match config.basis {
            EligibilityBasis::RelationshipOnly => None,
            EligibilityBasis::ExtractedContract => Some(contract),
        },
    }
}
