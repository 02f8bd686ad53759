// Plot Contract Library - cemetery contract digitization and inheritance checks
// This exposes the core components for testing and integration

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;
pub mod upload;
pub mod view;
pub mod workflow;

// Re-export key types for easy access
pub use api::HttpContractServices;
pub use config::{config, init_config, EligibilityBasis, EligibilityConfig, PlotContractConfig};
pub use error::{ApiError, TransitionError};
pub use telemetry::{create_request_span, generate_correlation_id, init_telemetry};
pub use types::{ContractData, EligibilityRequest, HeirRelationship, InheritanceChecklist, SelectedFile};
pub use upload::{UploadEvent, UploadSurface};
pub use view::{format_yen, ChecklistBranch, ChecklistView, ContractView, WorkflowView};
pub use workflow::{transition, ContractServices, Orchestrator, Phase, WorkflowEvent, WorkflowState};
