// Contract workflow state machine
//
// The whole flow lives in one serializable record. `transition` is pure: it
// never performs I/O, it returns the next record plus the effects the driver
// has to run (remote calls, alerts).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{TransitionError, ELIGIBILITY_FAILED_MESSAGE, EXTRACTION_FAILED_MESSAGE};
use crate::types::{ContractData, HeirRelationship, InheritanceChecklist, SelectedFile};

/// Phase derived from the state record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Extracting,
    Extracted,
    Checking,
    Checked,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Extracting => "extracting",
            Phase::Extracted => "extracted",
            Phase::Checking => "checking",
            Phase::Checked => "checked",
        };
        f.write_str(name)
    }
}

/// The two request slots that carry a generation token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestSlot {
    Extraction,
    Eligibility,
}

impl fmt::Display for RequestSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSlot::Extraction => f.write_str("extraction"),
            RequestSlot::Eligibility => f.write_str("eligibility"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    pub file: Option<SelectedFile>,
    pub contract: Option<ContractData>,
    pub extraction_error: Option<String>,
    pub extracting: bool,
    pub relationship: HeirRelationship,
    pub checklist: Option<InheritanceChecklist>,
    pub checklist_loading: bool,
    /// Token of the extraction request whose response may still be applied
    pub extraction_generation: u64,
    /// Token of the eligibility request whose response may still be applied
    pub eligibility_generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowEvent {
    FileSelected { file: SelectedFile },
    ExtractionSucceeded { generation: u64, contract: ContractData },
    ExtractionFailed { generation: u64, reason: String },
    RelationshipChanged { relationship: HeirRelationship },
    CheckRequested,
    CheckSucceeded { generation: u64, checklist: InheritanceChecklist },
    CheckFailed { generation: u64, reason: String },
    ResetChecklist,
    Cancel,
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::FileSelected { .. } => "file_selected",
            WorkflowEvent::ExtractionSucceeded { .. } => "extraction_succeeded",
            WorkflowEvent::ExtractionFailed { .. } => "extraction_failed",
            WorkflowEvent::RelationshipChanged { .. } => "relationship_changed",
            WorkflowEvent::CheckRequested => "check_requested",
            WorkflowEvent::CheckSucceeded { .. } => "check_succeeded",
            WorkflowEvent::CheckFailed { .. } => "check_failed",
            WorkflowEvent::ResetChecklist => "reset_checklist",
            WorkflowEvent::Cancel => "cancel",
        }
    }
}

/// Work the driver performs on behalf of a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Extract {
        generation: u64,
        file: SelectedFile,
    },
    CheckEligibility {
        generation: u64,
        relationship: HeirRelationship,
        contract: ContractData,
    },
    Alert {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: WorkflowState,
    pub effects: Vec<Effect>,
}

impl Step {
    fn quiet(state: WorkflowState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.extracting {
            Phase::Extracting
        } else if self.contract.is_none() {
            Phase::Idle
        } else if self.checklist_loading {
            Phase::Checking
        } else if self.checklist.is_some() {
            Phase::Checked
        } else {
            Phase::Extracted
        }
    }

    /// True while a remote call's result is still expected
    pub fn is_busy(&self) -> bool {
        self.extracting || self.checklist_loading
    }

    fn not_allowed(&self, event: &'static str) -> TransitionError {
        TransitionError::NotAllowed {
            event,
            phase: self.phase(),
        }
    }

    fn ensure_current(&self, slot: RequestSlot, generation: u64) -> Result<(), TransitionError> {
        let current = match slot {
            RequestSlot::Extraction => self.extraction_generation,
            RequestSlot::Eligibility => self.eligibility_generation,
        };
        if generation == current {
            Ok(())
        } else {
            Err(TransitionError::Superseded {
                slot,
                generation,
                current,
            })
        }
    }
}

/// Apply one event to the workflow
///
/// On error the caller keeps `state` unchanged. Responses carrying an
/// outdated generation are rejected as `Superseded`.
pub fn transition(state: &WorkflowState, event: WorkflowEvent) -> Result<Step, TransitionError> {
    let phase = state.phase();
    let name = event.name();
    match event {
        WorkflowEvent::FileSelected { file } => {
            let extraction_generation = state.extraction_generation + 1;
            let next = WorkflowState {
                file: Some(file.clone()),
                contract: None,
                extraction_error: None,
                extracting: true,
                relationship: state.relationship,
                checklist: None,
                checklist_loading: false,
                extraction_generation,
                // Any eligibility call still in flight belongs to the old contract
                eligibility_generation: state.eligibility_generation + 1,
            };
            Ok(Step {
                state: next,
                effects: vec![Effect::Extract {
                    generation: extraction_generation,
                    file,
                }],
            })
        }

        WorkflowEvent::ExtractionSucceeded { generation, contract } => {
            state.ensure_current(RequestSlot::Extraction, generation)?;
            if phase != Phase::Extracting {
                return Err(state.not_allowed(name));
            }
            let mut next = state.clone();
            next.contract = Some(contract);
            next.extracting = false;
            Ok(Step::quiet(next))
        }

        WorkflowEvent::ExtractionFailed { generation, .. } => {
            state.ensure_current(RequestSlot::Extraction, generation)?;
            if phase != Phase::Extracting {
                return Err(state.not_allowed(name));
            }
            let mut next = state.clone();
            next.file = None;
            next.contract = None;
            next.extracting = false;
            next.extraction_error = Some(EXTRACTION_FAILED_MESSAGE.to_string());
            Ok(Step::quiet(next))
        }

        WorkflowEvent::RelationshipChanged { relationship } => {
            let mut next = state.clone();
            next.relationship = relationship;
            Ok(Step::quiet(next))
        }

        WorkflowEvent::CheckRequested => {
            if phase != Phase::Extracted {
                return Err(state.not_allowed(name));
            }
            let contract = match &state.contract {
                Some(contract) => contract.clone(),
                None => return Err(state.not_allowed(name)),
            };
            let mut next = state.clone();
            next.checklist_loading = true;
            next.eligibility_generation += 1;
            let generation = next.eligibility_generation;
            Ok(Step {
                state: next,
                effects: vec![Effect::CheckEligibility {
                    generation,
                    relationship: state.relationship,
                    contract,
                }],
            })
        }

        WorkflowEvent::CheckSucceeded { generation, checklist } => {
            state.ensure_current(RequestSlot::Eligibility, generation)?;
            if phase != Phase::Checking {
                return Err(state.not_allowed(name));
            }
            let mut next = state.clone();
            next.checklist = Some(checklist);
            next.checklist_loading = false;
            Ok(Step::quiet(next))
        }

        WorkflowEvent::CheckFailed { generation, .. } => {
            state.ensure_current(RequestSlot::Eligibility, generation)?;
            if phase != Phase::Checking {
                return Err(state.not_allowed(name));
            }
            let mut next = state.clone();
            next.checklist_loading = false;
            Ok(Step {
                state: next,
                effects: vec![Effect::Alert {
                    message: ELIGIBILITY_FAILED_MESSAGE.to_string(),
                }],
            })
        }

        WorkflowEvent::ResetChecklist => {
            if phase != Phase::Checked {
                return Err(state.not_allowed(name));
            }
            let mut next = state.clone();
            next.checklist = None;
            Ok(Step::quiet(next))
        }

        WorkflowEvent::Cancel => {
            if phase == Phase::Idle {
                return Err(state.not_allowed(name));
            }
            Ok(Step::quiet(WorkflowState {
                relationship: state.relationship,
                extraction_generation: state.extraction_generation + 1,
                eligibility_generation: state.eligibility_generation + 1,
                ..WorkflowState::default()
            }))
        }
    }
}
