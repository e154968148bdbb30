use std::env;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use url::Url;

use crate::api::recaptcha::SITEVERIFY_URL;
use crate::api::salesforce::SalesforceConfig;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
const DEFAULT_SALESFORCE_LOGIN_URL: &str = "https://login.salesforce.com";
const DEFAULT_SALESFORCE_API_VERSION: &str = "59.0";
const DEFAULT_LEADS_PER_MINUTE: u32 = 5;

#[derive(Debug, Clone)]
pub enum DestinationSettings {
    Salesforce(SalesforceConfig),
    Relay { url: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_address: SocketAddr,
    pub frontend_dist: Option<PathBuf>,
    pub allowed_origin: Option<String>,
    pub recaptcha_secret: String,
    pub recaptcha_verify_url: String,
    pub destination: DestinationSettings,
    pub leads_per_minute: NonZeroU32,
    // Only enable behind a proxy that appends the peer to X-Forwarded-For.
    pub trust_forwarded_headers: bool,
    pub sentry_dsn: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Settings> {
        Settings::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Settings> {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| optional(key).ok_or_else(|| anyhow!("{} must be set", key));

        let bind_address = optional("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDRESS must be host:port")?;

        let recaptcha_verify_url = optional("RECAPTCHA_VERIFY_URL")
            .unwrap_or_else(|| SITEVERIFY_URL.to_string());
        check_url("RECAPTCHA_VERIFY_URL", &recaptcha_verify_url)?;

        let destination = match optional("LEAD_DESTINATION").as_deref().unwrap_or("salesforce") {
            "salesforce" => {
                let login_url = optional("SALESFORCE_LOGIN_URL")
                    .unwrap_or_else(|| DEFAULT_SALESFORCE_LOGIN_URL.to_string());
                check_url("SALESFORCE_LOGIN_URL", &login_url)?;
                DestinationSettings::Salesforce(SalesforceConfig {
                    login_url,
                    client_id: required("SALESFORCE_CLIENT_ID")?,
                    client_secret: required("SALESFORCE_CLIENT_SECRET")?,
                    username: required("SALESFORCE_USERNAME")?,
                    password: required("SALESFORCE_PASSWORD")?,
                    api_version: optional("SALESFORCE_API_VERSION")
                        .unwrap_or_else(|| DEFAULT_SALESFORCE_API_VERSION.to_string()),
                })
            }
            "relay" => {
                let url = required("LEAD_RELAY_URL")?;
                check_url("LEAD_RELAY_URL", &url)?;
                DestinationSettings::Relay { url }
            }
            other => bail!("LEAD_DESTINATION must be 'salesforce' or 'relay', got '{}'", other),
        };

        let leads_per_minute = optional("LEADS_PER_MINUTE")
            .map(|value| value.parse::<u32>().ok())
            .unwrap_or(Some(DEFAULT_LEADS_PER_MINUTE))
            .and_then(NonZeroU32::new)
            .ok_or_else(|| anyhow!("LEADS_PER_MINUTE must be a positive number"))?;

        let trust_forwarded_headers = match optional("TRUST_FORWARDED_HEADERS").as_deref() {
            None => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => bail!("TRUST_FORWARDED_HEADERS must be true or false, got '{}'", other),
        };

        Ok(Settings {
            bind_address,
            frontend_dist: optional("FRONTEND_DIST").map(PathBuf::from),
            allowed_origin: optional("ALLOWED_ORIGIN"),
            recaptcha_secret: required("RECAPTCHA_SECRET_KEY")?,
            recaptcha_verify_url,
            destination,
            leads_per_minute,
            trust_forwarded_headers,
            sentry_dsn: optional("SENTRY_DSN"),
        })
    }
}

fn check_url(key: &str, value: &str) -> anyhow::Result<()> {
    Url::parse(value)
        .map(|_| ())
        .with_context(|| format!("{} is not a valid URL: {}", key, value))
}
