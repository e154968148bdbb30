use std::net::IpAddr;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Deserialize)]
pub struct SiteVerifyResponse {
    pub success: bool,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

#[derive(Debug, Error)]
pub enum RecaptchaError {
    #[error("challenge token rejected: {0:?}")]
    Rejected(Vec<String>),
    #[error("siteverify request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("siteverify answered {0}")]
    Status(u16),
}

/// Server-side half of the bot challenge: asks Google whether a token is genuine.
pub struct RecaptchaVerifier {
    client: Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(client: Client, secret: String, verify_url: String) -> Self {
        Self {
            client,
            secret,
            verify_url,
        }
    }

    pub async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> Result<(), RecaptchaError> {
        let mut form = vec![
            ("secret", self.secret.clone()),
            ("response", token.to_string()),
        ];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip.to_string()));
        }

        let response = self.client.post(&self.verify_url).form(&form).send().await?;
        if !response.status().is_success() {
            warn!("siteverify returned status {}", response.status());
            return Err(RecaptchaError::Status(response.status().as_u16()));
        }

        let verdict: SiteVerifyResponse = response.json().await?;
        if verdict.success {
            info!("Challenge token verified for host {:?}", verdict.hostname);
            Ok(())
        } else {
            warn!("Challenge token rejected: {:?}", verdict.error_codes);
            Err(RecaptchaError::Rejected(verdict.error_codes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn verifier(server: &MockServer) -> RecaptchaVerifier {
        RecaptchaVerifier::new(Client::new(), "site-secret".to_string(), server.url("/siteverify"))
    }

    #[tokio::test]
    async fn test_verify_success_sends_secret_token_and_ip() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/siteverify")
                .header("content-type", "application/x-www-form-urlencoded")
                .x_www_form_urlencoded_tuple("secret", "site-secret")
                .x_www_form_urlencoded_tuple("response", "token-1")
                .x_www_form_urlencoded_tuple("remoteip", "203.0.113.7");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"success": true, "hostname": "diffrenzz.com"}"#);
        });

        let result = verifier(&server)
            .verify("token-1", Some("203.0.113.7".parse().unwrap()))
            .await;
        assert!(result.is_ok());
        mock.assert();
    }

    #[tokio::test]
    async fn test_verify_rejected_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/siteverify");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"success": false, "error-codes": ["timeout-or-duplicate"]}"#);
        });

        let result = verifier(&server).verify("token-1", None).await;
        match result {
            Err(RecaptchaError::Rejected(codes)) => {
                assert_eq!(codes, vec!["timeout-or-duplicate".to_string()])
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/siteverify");
            then.status(503);
        });

        let result = verifier(&server).verify("token-1", None).await;
        assert!(matches!(result, Err(RecaptchaError::Status(503))));
    }
}
