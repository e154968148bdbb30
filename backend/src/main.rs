use dotenvy::dotenv;
use axum::{
    http::{HeaderValue, Method, header},
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{TraceLayer, DefaultMakeSpan, DefaultOnResponse};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use anyhow::Context;
use sentry;

mod handlers {
    pub mod api_error;
    pub mod client_ip;
    pub mod lead_handlers;
}
mod api {
    pub mod intake_relay;
    pub mod recaptcha;
    pub mod salesforce;
}
mod config {
    pub mod settings;
}
mod utils {
    pub mod rate_limit;
}
mod jobs {
    pub mod scheduler;
}

use api::intake_relay::IntakeRelay;
use api::recaptcha::RecaptchaVerifier;
use api::salesforce::SalesforceClient;
use config::settings::{DestinationSettings, Settings};
use handlers::lead_handlers::{self, LeadDestination};
use utils::rate_limit::LeadRateLimiter;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(20);

async fn health_check() -> &'static str {
    "OK"
}

pub struct AppState {
    verifier: RecaptchaVerifier,
    destination: LeadDestination,
    rate_limiter: LeadRateLimiter,
    trust_forwarded_headers: bool,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<AppState> {
        let client = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let destination = match &settings.destination {
            DestinationSettings::Salesforce(config) => {
                LeadDestination::Salesforce(SalesforceClient::new(client.clone(), config.clone()))
            }
            DestinationSettings::Relay { url } => {
                LeadDestination::Relay(IntakeRelay::new(client.clone(), url.clone()))
            }
        };

        Ok(AppState {
            verifier: RecaptchaVerifier::new(
                client,
                settings.recaptcha_secret.clone(),
                settings.recaptcha_verify_url.clone(),
            ),
            destination,
            rate_limiter: LeadRateLimiter::per_minute(settings.leads_per_minute),
            trust_forwarded_headers: settings.trust_forwarded_headers,
        })
    }
}

pub fn router(state: Arc<AppState>, frontend_dist: Option<&Path>) -> Router {
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/leads", post(lead_handlers::submit_lead))
        .with_state(state);

    // The built frontend is served from the same origin as /api/leads
    let app = match frontend_dist {
        Some(dist) => app.fallback_service(
            ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html"))),
        ),
        None => app,
    };

    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin).context("ALLOWED_ORIGIN is not a valid header value")?,
        ),
        None => AllowOrigin::from(Any),
    };
    Ok(CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(origin)
        .allow_headers([header::CONTENT_TYPE]))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let _guard = settings.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((dsn, sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        }))
    });

    let state = Arc::new(AppState::from_settings(&settings)?);

    let app = router(state.clone(), settings.frontend_dist.as_deref())
        .layer(cors_layer(settings.allowed_origin.as_deref())?);

    // Start the scheduler
    let state_for_scheduler = state.clone();
    tokio::spawn(async move {
        jobs::scheduler::start_scheduler(state_for_scheduler).await;
    });

    use tokio::net::TcpListener;

    let listener = TcpListener::bind(settings.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_address))?;
    info!("Listening on {}", settings.bind_address);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::num::NonZeroU32;
    use tower::ServiceExt;

    fn state() -> Arc<AppState> {
        let client = Client::new();
        Arc::new(AppState {
            verifier: RecaptchaVerifier::new(
                client.clone(),
                "secret".to_string(),
                "http://127.0.0.1:9/siteverify".to_string(),
            ),
            destination: LeadDestination::Relay(IntakeRelay::new(
                client,
                "http://127.0.0.1:9/lead".to_string(),
            )),
            rate_limiter: LeadRateLimiter::per_minute(NonZeroU32::new(5).unwrap()),
            trust_forwarded_headers: false,
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = router(state(), None)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_frontend_fallback_serves_index() {
        let dist = std::env::temp_dir().join(format!("diffrenzz-dist-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("index.html"), "<h1>Diffrenzz</h1>").unwrap();

        let response = router(state(), Some(&dist))
            .oneshot(Request::builder().uri("/services").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>Diffrenzz</h1>");

        std::fs::remove_dir_all(&dist).unwrap();
    }

    #[test]
    fn test_cors_origin_must_be_a_header_value() {
        assert!(cors_layer(Some("https://diffrenzz.com")).is_ok());
        assert!(cors_layer(Some("bad\norigin")).is_err());
        assert!(cors_layer(None).is_ok());
    }
}
