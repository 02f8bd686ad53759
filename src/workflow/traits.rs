// Traits for dependency injection - the two remote collaborators behind one seam

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{ContractData, EligibilityRequest, InheritanceChecklist, SelectedFile};

/// Remote services the workflow depends on
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContractServices: Send + Sync {
    /// Upload a scanned contract and receive the extracted fields
    async fn extract(&self, file: &SelectedFile) -> Result<ContractData, ApiError>;

    /// Ask whether the contract can pass to the given heir relationship
    async fn check_eligibility(&self, request: &EligibilityRequest) -> Result<InheritanceChecklist, ApiError>;
}
