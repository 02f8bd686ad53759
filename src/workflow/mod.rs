// Contract workflow - pure state machine plus the async driver that owns it

pub mod orchestrator;
pub mod state_machine;
pub mod traits;

#[cfg(test)]
pub mod mocks;


pub use orchestrator::{eligibility_request, Orchestrator};
pub use state_machine::{transition, Effect, Phase, RequestSlot, Step, WorkflowEvent, WorkflowState};
pub use traits::ContractServices;
