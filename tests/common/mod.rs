#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};

use pantry_api::{app, AppConfig, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    /// Start a fresh server with its own in-memory database.
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.database.url = "sqlite::memory:".to_string();
        config.server.port = port;
        config.server.enable_request_logging = false;

        let state = AppState::connect(config).await?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            port,
            base_url,
            client: Client::new(),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn signup(&self, username: &str, password: &str, role: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/api/v1/signup"))
            .json(&json!({ "username": username, "password": password, "role": role }))
            .send()
            .await?)
    }

    pub async fn signin(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/api/v1/signin"))
            .basic_auth(username, Some(password))
            .send()
            .await?)
    }

    /// Sign up (if needed) and sign in, returning the bearer token.
    pub async fn token_for(&self, username: &str, role: &str) -> Result<String> {
        let _ = self.signup(username, "password", role).await?;
        let res = self.signin(username, "password").await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "signin failed: {}", res.status());
        let body = res.json::<Value>().await?;
        body["user"]["token"]
            .as_str()
            .map(str::to_string)
            .context("signin response has no token")
    }

    pub fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("bearer {}", token))
    }

    pub async fn add_food(&self, version: &str, token: &str, name: &str) -> Result<reqwest::Response> {
        Ok(self
            .authed(self.client.post(self.url(&format!("/api/{}/food", version))), token)
            .json(&json!({ "name": name, "calories": 100, "type": "fruit" }))
            .send()
            .await?)
    }
}

pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
