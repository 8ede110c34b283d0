//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use pitboy_gateway::{ApiServerBuilder, ChatProvider, Config, api};

/// Build the full router from environment-style pairs
pub fn router_from_env(pairs: &[(&str, &str)]) -> axum::Router {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let config = Config::from_lookup(|key| map.get(key).cloned()).expect("valid test config");
    let server = ApiServerBuilder::from_config(&config)
        .expect("failed to build server")
        .build();
    api::router(server.state())
}

/// Serve a router on an ephemeral local port and return its base URL
pub async fn spawn_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// POST a JSON body, optionally with an `x-api-key` header
pub fn post_json(uri: &str, body: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Read a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Chat provider that counts calls and echoes
#[derive(Default)]
pub struct CountingProvider {
    pub calls: AtomicUsize,
}

impl CountingProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for CountingProvider {
    async fn generate(&self, text: &str, source: &str) -> pitboy_gateway::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{source}:{text}"))
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Router around a counting chat provider
pub fn counting_router(api_key: Option<&str>) -> (axum::Router, Arc<CountingProvider>) {
    let provider = Arc::new(CountingProvider::default());
    let config = Config::from_lookup(|_| None).unwrap();
    let speech = pitboy_gateway::speech::from_config(&config.speech, reqwest::Client::new());
    let server = ApiServerBuilder::new(0, provider.clone(), speech)
        .api_key(api_key.map(|k| secrecy::SecretString::from(k.to_string())))
        .build();
    (api::router(server.state()), provider)
}
