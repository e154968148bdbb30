use diffrenzz_leads::LeadSubmission;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

pub const LEAD_SOURCE: &str = "Website";
pub const PLACEHOLDER_LAST_NAME: &str = "Unknown";
pub const PLACEHOLDER_COMPANY: &str = "[not provided]";

#[derive(Clone)]
pub struct SalesforceConfig {
    pub login_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub api_version: String,
}

impl std::fmt::Debug for SalesforceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceConfig")
            .field("login_url", &self.login_url)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct SalesforceToken {
    pub access_token: String,
    pub instance_url: String,
}

/// Lead record as the Salesforce REST API expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesforceLead {
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Subject__c")]
    pub subject: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "LeadSource")]
    pub lead_source: String,
    #[serde(rename = "Recaptcha_Token__c")]
    pub recaptcha_token: String,
}

impl SalesforceLead {
    pub fn from_submission(submission: &LeadSubmission) -> Self {
        let (first_name, last_name) = name_parts(&submission.first_name, &submission.last_name);
        SalesforceLead {
            first_name,
            last_name,
            email: submission.email.clone(),
            company: submission
                .company
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_COMPANY.to_string()),
            subject: submission.subject.label().to_string(),
            description: submission.message.clone(),
            lead_source: LEAD_SOURCE.to_string(),
            recaptcha_token: submission.verification_token.as_str().to_string(),
        }
    }
}

/// Salesforce requires a last name. Submissions always carry one, so the
/// placeholder only covers leads created from other intake paths.
pub fn name_parts(first: &str, last: &str) -> (String, String) {
    let last = last.trim();
    let last = if last.is_empty() { PLACEHOLDER_LAST_NAME } else { last };
    (first.trim().to_string(), last.to_string())
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

#[derive(Debug, Error)]
pub enum SalesforceError {
    #[error("salesforce request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token exchange answered {status}: {body}")]
    Auth { status: u16, body: String },
    #[error("lead creation answered {status}: {body}")]
    Create { status: u16, body: String },
}

pub struct SalesforceClient {
    client: Client,
    config: SalesforceConfig,
}

impl SalesforceClient {
    pub fn new(client: Client, config: SalesforceConfig) -> Self {
        Self { client, config }
    }

    /// Resource-owner password grant against the org's token endpoint.
    pub async fn authenticate(&self) -> Result<SalesforceToken, SalesforceError> {
        let url = format!(
            "{}/services/oauth2/token",
            self.config.login_url.trim_end_matches('/')
        );
        let params = [
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Salesforce token exchange failed with {}: {}", status, body);
            return Err(SalesforceError::Auth {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<SalesforceToken>().await?)
    }

    pub async fn create_lead(
        &self,
        token: &SalesforceToken,
        lead: &SalesforceLead,
    ) -> Result<String, SalesforceError> {
        let url = format!(
            "{}/services/data/v{}/sobjects/Lead",
            token.instance_url.trim_end_matches('/'),
            self.config.api_version
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token.access_token)
            .json(lead)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Salesforce lead creation failed with {}: {}", status, body);
            return Err(SalesforceError::Create {
                status: status.as_u16(),
                body,
            });
        }

        let created = response.json::<CreateResponse>().await?;
        info!("Created Salesforce lead {}", created.id);
        Ok(created.id)
    }

    /// Token exchange then lead creation; returns the new record id.
    pub async fn submit(&self, submission: &LeadSubmission) -> Result<String, SalesforceError> {
        let token = self.authenticate().await?;
        self.create_lead(&token, &SalesforceLead::from_submission(submission))
            .await
    }
}
