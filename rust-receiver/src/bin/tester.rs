//! PageHook Tester - replays handshake and signed deliveries against a
//! running endpoint.
//!
//! Uses the same `VERIFY_TOKEN` / `APP_SECRET` environment as the server and
//! targets `WEBHOOK_URL` (default `http://localhost:3000/webhook`). All
//! scenarios run concurrently; the process fails if any of them does.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::future::join_all;
use rand::Rng;
use reqwest::{Client, StatusCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use pagehook::{sign_payload, Config, EVENT_RECEIVED};

const DEFAULT_WEBHOOK_URL: &str = "http://localhost:3000/webhook";

const PAGE_EVENT: &str = r#"{"object":"page","entry":[{"messaging":[{"sender":{"id":"sender_123"},"message":{"text":"Hello World"}}]}]}"#;

/// A single request and the response it should produce.
struct Scenario {
    name: &'static str,
    request: reqwest::RequestBuilder,
    expected_status: StatusCode,
    expected_body: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    let config = Config::from_env();
    let webhook_url = env::var("WEBHOOK_URL").unwrap_or_else(|_| DEFAULT_WEBHOOK_URL.to_string());
    let base = Url::parse(&webhook_url).context("Invalid WEBHOOK_URL")?;

    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    let scenarios = build_scenarios(&client, &base, &config)?;
    let total = scenarios.len();

    let results = join_all(scenarios.into_iter().map(run_scenario)).await;
    let failed = results.iter().filter(|passed| !**passed).count();

    info!(total = total, failed = failed, "tester_complete");

    if failed > 0 {
        bail!("{failed} of {total} scenarios failed");
    }
    Ok(())
}

fn build_scenarios(client: &Client, base: &Url, config: &Config) -> Result<Vec<Scenario>> {
    let challenge = rand::thread_rng().gen_range(10_000..100_000u32).to_string();
    let signature = sign_payload(&config.app_secret, PAGE_EVENT.as_bytes())
        .context("Failed to sign test payload")?;

    let handshake = |token: &str| {
        let mut url = base.clone();
        url.query_pairs_mut()
            .append_pair("hub.mode", "subscribe")
            .append_pair("hub.verify_token", token)
            .append_pair("hub.challenge", &challenge);
        client.get(url)
    };

    let delivery = |signature: Option<&str>, body: &'static str| {
        let mut request = client
            .post(base.clone())
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(sig) = signature {
            request = request.header("X-Hub-Signature", sig);
        }
        request
    };

    Ok(vec![
        Scenario {
            name: "handshake_confirmed",
            request: handshake(&config.verify_token),
            expected_status: StatusCode::OK,
            expected_body: Some(challenge.clone()),
        },
        Scenario {
            name: "handshake_wrong_token",
            request: handshake("WRONG"),
            expected_status: StatusCode::FORBIDDEN,
            expected_body: None,
        },
        Scenario {
            name: "delivery_signed",
            request: delivery(Some(signature.as_str()), PAGE_EVENT),
            expected_status: StatusCode::OK,
            expected_body: Some(EVENT_RECEIVED.to_string()),
        },
        Scenario {
            name: "delivery_invalid_hash",
            request: delivery(Some("sha1=invalidhash"), PAGE_EVENT),
            expected_status: StatusCode::FORBIDDEN,
            expected_body: None,
        },
        Scenario {
            name: "delivery_unsigned",
            request: delivery(None, PAGE_EVENT),
            expected_status: StatusCode::FORBIDDEN,
            expected_body: None,
        },
        Scenario {
            name: "delivery_wrong_method",
            request: delivery(Some("md5=0123456789abcdef"), PAGE_EVENT),
            expected_status: StatusCode::FORBIDDEN,
            expected_body: None,
        },
    ])
}

async fn run_scenario(scenario: Scenario) -> bool {
    let response = match scenario.request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!(scenario = scenario.name, error = %e, "scenario_request_failed");
            return false;
        }
    };

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let status_ok = status == scenario.expected_status;
    let body_ok = scenario
        .expected_body
        .as_ref()
        .map(|expected| *expected == body)
        .unwrap_or(true);

    if status_ok && body_ok {
        info!(scenario = scenario.name, status_code = status.as_u16(), "scenario_passed");
        true
    } else {
        error!(
            scenario = scenario.name,
            status_code = status.as_u16(),
            expected_status = scenario.expected_status.as_u16(),
            body = %body,
            "scenario_failed"
        );
        false
    }
}
