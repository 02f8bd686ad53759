// Scripted service doubles - responses are released by the test, in any order

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::error::ApiError;
use crate::types::{ContractData, EligibilityRequest, InheritanceChecklist, SelectedFile};
use crate::workflow::traits::ContractServices;

type ExtractionReply = Result<ContractData, ApiError>;
type CheckReply = Result<InheritanceChecklist, ApiError>;

/// Services whose responses are held back until the test sends them
#[derive(Debug, Default)]
pub struct ScriptedServices {
    extractions: Mutex<HashMap<String, oneshot::Receiver<ExtractionReply>>>,
    checks: Mutex<VecDeque<oneshot::Receiver<CheckReply>>>,
    uploaded: Mutex<Vec<String>>,
    check_requests: Mutex<Vec<EligibilityRequest>>,
}

impl ScriptedServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the reply channel for an upload of `file_name`
    pub fn script_extraction(&self, file_name: &str) -> oneshot::Sender<ExtractionReply> {
        let (tx, rx) = oneshot::channel();
        self.extractions.lock().unwrap().insert(file_name.to_string(), rx);
        tx
    }

    /// Register the reply channel for the next eligibility request
    pub fn script_check(&self) -> oneshot::Sender<CheckReply> {
        let (tx, rx) = oneshot::channel();
        self.checks.lock().unwrap().push_back(rx);
        tx
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn check_requests(&self) -> Vec<EligibilityRequest> {
        self.check_requests.lock().unwrap().clone()
    }
}

fn unscripted() -> ApiError {
    ApiError::Status {
        status: 500,
        body: "no scripted response".to_string(),
    }
}

#[async_trait]
impl ContractServices for ScriptedServices {
    async fn extract(&self, file: &SelectedFile) -> Result<ContractData, ApiError> {
        self.uploaded.lock().unwrap().push(file.name.clone());
        let reply = self.extractions.lock().unwrap().remove(&file.name);
        match reply {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(unscripted())),
            None => Err(unscripted()),
        }
    }

    async fn check_eligibility(&self, request: &EligibilityRequest) -> Result<InheritanceChecklist, ApiError> {
        self.check_requests.lock().unwrap().push(request.clone());
        let reply = self.checks.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(unscripted())),
            None => Err(unscripted()),
        }
    }
}
