use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{ContractData, EligibilityRequest, InheritanceChecklist, SelectedFile};
use crate::workflow::ContractServices;

/// HTTP client for the extraction and inheritance-check endpoints
#[derive(Debug, Clone)]
pub struct HttpContractServices {
    client: reqwest::Client,
    extract_url: String,
    check_url: String,
    timeout: Option<Duration>,
}

impl HttpContractServices {
    /// Create a client for the service at `config.base_url`
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base = config.base_url.trim_end_matches('/');
        Ok(Self {
            client: builder.build()?,
            extract_url: join_url(base, &config.extract_path),
            check_url: join_url(base, &config.check_path),
            timeout,
        })
    }

    pub fn extract_url(&self) -> &str {
        &self.extract_url
    }

    pub fn check_url(&self) -> &str {
        &self.check_url
    }

    async fn read_json<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => ApiError::Timeout {
                seconds: timeout.as_secs(),
            },
            _ => ApiError::Network(err),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

#[async_trait]
impl ContractServices for HttpContractServices {
    async fn extract(&self, file: &SelectedFile) -> Result<ContractData, ApiError> {
        let part = Part::bytes(file.content().to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        info!(url = %self.extract_url, file = %file.name, "POST extraction");
        let resp = self
            .client
            .post(&self.extract_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let contract: ContractData = self.read_json(resp).await?;
        debug!(plot_number = %contract.plot_number, confidence = ?contract.confidence_score, "Extraction decoded");
        Ok(contract)
    }

    async fn check_eligibility(&self, request: &EligibilityRequest) -> Result<InheritanceChecklist, ApiError> {
        info!(url = %self.check_url, relationship = %request.heir_relationship, "POST eligibility check");
        let resp = self
            .client
            .post(&self.check_url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let checklist: InheritanceChecklist = self.read_json(resp).await?;
        debug!(
            documents = checklist.required_documents.len(),
            can_transfer = checklist.can_transfer,
            "Eligibility decoded"
        );
        Ok(checklist)
    }
}
