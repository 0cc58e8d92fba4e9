//! Shared setup for the integration tests: a served app wired to a Mailchimp mock.
use std::{
    net::SocketAddr,
    sync::OnceLock,
};

use anyhow::Result;
use mailchimp_signup::{
    config::{AppConfig, MailchimpConfig, NetConfig},
    init_dbg_tracing, App,
};
use reqwest::Response;
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const LIST_ID: &str = "a1b2c3d4e5";

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub mailchimp_server: MockServer,
}

/// Set `TEST_LOG` to see the application logs while testing.
fn init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_dbg_tracing();
        }
    });
}

impl TestApp {
    /// Spawns the app on a random port, talking to a fresh Mailchimp mock server.
    pub async fn spawn() -> Result<Self> {
        init_test_subscriber();

        let mailchimp_server = MockServer::start().await;
        let config = AppConfig {
            net_config: NetConfig {
                host: [127, 0, 0, 1],
                // Trying to bind port 0 will trigger an OS scan for an available port
                app_port: 0,
                static_dir: "public".into(),
            },
            mailchimp_config: MailchimpConfig {
                api_key: Some(SecretString::from("0123456789abcdef-us21".to_string())),
                list_id: Some(LIST_ID.to_string()),
                server: Some("us21".to_string()),
                base_url: Some(format!("{}/3.0/", mailchimp_server.uri())),
                timeout_millis: 200,
            },
        };

        let app = App::build_from_config(config).await?;
        let addr = app.listener.local_addr()?;
        tokio::spawn(mailchimp_signup::serve(app));

        Ok(TestApp {
            addr,
            http_client: reqwest::Client::new(),
            mailchimp_server,
        })
    }

    pub async fn signup_get(&self) -> Result<Response> {
        let resp = self
            .http_client
            .get(format!("http://{}/signup", self.addr))
            .send()
            .await?;
        Ok(resp)
    }

    pub async fn signup_post(&self, body: &Value) -> Result<Response> {
        let resp = self
            .http_client
            .post(format!("http://{}/signup", self.addr))
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    /// Mounts a mock answering the batch endpoint with `status` and a JSON `body`, expected `times` times.
    pub async fn mock_batch_response(&self, status: u16, body: Value, times: u64) {
        Mock::given(path(format!("/3.0/lists/{LIST_ID}")))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(times)
            .mount(&self.mailchimp_server)
            .await;
    }
}

pub fn valid_signup() -> Value {
    json!({
        "email": "le_guin@gmail.com",
        "fname": "Ursula",
        "lname": "Le Guin",
    })
}

/// Reads the normalized body and checks the `success` flag on the way.
pub async fn assert_result(resp: Response, expected_success: bool) -> Result<Value> {
    let body: Value = resp.json().await?;
    assert_eq!(
        json!(expected_success),
        body["success"],
        "unexpected success flag in body: {body}"
    );
    Ok(body)
}
