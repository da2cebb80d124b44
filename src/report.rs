//! Suspicious-activity reporting
//!
//! Two collaborator seams: resolving the recipient's notification address
//! and dispatching the actual report. Both are external services; failures
//! surface in the session's report state only.

use crate::error::ReportError;
use serde::Serialize;
use serde_json::json;

/// Resolves the current user's notification address, if any.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn notification_address(&self) -> Option<String>;
}

/// Identity provider with a fixed, configuration-supplied address.
pub struct StaticIdentity {
    address: Option<String>,
}

impl StaticIdentity {
    pub fn new(address: Option<String>) -> Self {
        Self { address }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for StaticIdentity {
    async fn notification_address(&self) -> Option<String> {
        self.address.clone()
    }
}

/// Extra content attached to a dispatched report.
#[derive(Debug, Clone, Default)]
pub struct ReportMetadata {
    /// Message override; dispatchers supply a default when absent
    pub message: Option<String>,
}

/// Delivers a suspicious-activity report to a recipient address.
#[async_trait::async_trait]
pub trait ReportDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        recipient: &str,
        metadata: &ReportMetadata,
    ) -> Result<(), ReportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// State of the user-invoked report action. Independent of the alert
/// lifecycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportState {
    pub status: ReportStatus,
    pub message: String,
}

const DEFAULT_MESSAGE: &str = "BikeGuard detected suspicious activity. \
Review your live feed and secure your bike immediately.";

/// Email dispatcher for EmailJS-style template endpoints.
pub struct EmailDispatcher {
    http: reqwest::Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
}

impl EmailDispatcher {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        service_id: impl Into<String>,
        template_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            service_id: service_id.into(),
            template_id: template_id.into(),
            public_key: public_key.into(),
        }
    }
}

#[async_trait::async_trait]
impl ReportDispatcher for EmailDispatcher {
    async fn dispatch(
        &self,
        recipient: &str,
        metadata: &ReportMetadata,
    ) -> Result<(), ReportError> {
        if self.service_id.is_empty() || self.template_id.is_empty() || self.public_key.is_empty()
        {
            return Err(ReportError::Dispatch(
                "email service is not configured".to_string(),
            ));
        }

        let payload = json!({
            "service_id": self.service_id,
            "template_id": self.template_id,
            "user_id": self.public_key,
            "template_params": {
                "to_email": recipient,
                "subject": "potential bike theft",
                "message": metadata.message.as_deref().unwrap_or(DEFAULT_MESSAGE),
            },
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ReportError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                "email request failed".to_string()
            } else {
                text
            };
            return Err(ReportError::Dispatch(message));
        }
        Ok(())
    }
}
