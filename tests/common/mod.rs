#![allow(dead_code)]

use std::sync::Arc;

use reqwest::Client;
use server::config::Config;
use sgf_core::DiagramRenderer;
use sgf_render::BoardRenderer;

/// A server bound to an ephemeral local port for the duration of a test.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    /// Build a URL for an API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and return the status with the parsed response.
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> (u16, serde_json::Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status().as_u16();
        let body = response.json().await.expect("Response was not JSON");
        (status, body)
    }
}

pub async fn spawn() -> TestServer {
    spawn_with(Config::default(), Arc::new(BoardRenderer::new())).await
}

pub async fn spawn_with(config: Config, renderer: Arc<dyn DiagramRenderer>) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let app = server::app(config, renderer);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        client: Client::new(),
    }
}

pub const TWO_MOVES: &str = "(;FF[4]GM[1]SZ[19];B[dd];W[pd])";
pub const HANDICAP: &str = "(;FF[4]GM[1]SZ[19]HA[4]AB[dd][pd][dp][pp];W[qf])";
pub const BRANCHING: &str = "(;FF[4]GM[1]SZ[19];B[dd](;W[pd])(;W[dp]))";
