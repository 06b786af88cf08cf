/*!
Endpoint HTTP mock pour développement sans API de monitoring

Permet de tester le simulateur sans dépendre de l'API distante.
Démarre un serveur Axum sur un port éphémère, enregistre toutes les requêtes
reçues et répond avec un statut/corps configurable.
*/

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use anyhow::Result;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Chemin utilisé par défaut dans les URLs retournées
pub const MONITOR_PATH: &str = "/api/process/monitor";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: "application/json".to_string(),
            body: r#"{"processed":0,"triggers_detected":0,"es_notifications":0}"#.to_string(),
        }
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    response: Arc<Mutex<MockResponse>>,
}

/// Mock de l'API de monitoring (toutes routes, toutes méthodes)
pub struct MockMonitorEndpoint {
    addr: SocketAddr,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockMonitorEndpoint {
    /// Démarre le serveur mock sur 127.0.0.1 (port éphémère)
    pub async fn start() -> Result<Self> {
        let state = MockState::default();
        let app = Router::new()
            .fallback(record_request)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("❌ [MOCK] Server stopped: {}", e);
            }
        });

        log::info!("🧪 [MOCK] Monitor endpoint listening on http://{}", addr);
        Ok(Self { addr, state, server })
    }

    /// URL complète de l'endpoint de monitoring mocké
    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, MONITOR_PATH)
    }

    /// Configure une réponse JSON 200
    pub fn respond_with_json(&self, body: Value) {
        *self.state.response.lock().unwrap() = MockResponse {
            body: body.to_string(),
            ..MockResponse::default()
        };
    }

    /// Configure une réponse brute (statut + corps quelconque)
    pub fn respond_with<S: Into<String>>(&self, status: u16, body: S) {
        *self.state.response.lock().unwrap() = MockResponse {
            status,
            content_type: "text/plain".to_string(),
            body: body.into(),
        };
    }

    /// Récupère toutes les requêtes reçues (pour assertions de tests)
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Parse le corps de la dernière requête en JSON
    pub fn last_json<T>(&self) -> Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let requests = self.state.requests.lock().unwrap();
        match requests.last() {
            Some(last) => Ok(Some(serde_json::from_slice(&last.body)?)),
            None => Ok(None),
        }
    }

    /// Attend qu'au moins `count` requêtes soient arrivées
    pub async fn wait_for_requests(&self, count: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();

        while start.elapsed() < Duration::from_millis(timeout_ms) {
            if self.request_count() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        log::warn!("⏰ Timeout waiting for {} requests", count);
        false
    }

    /// Reset toutes les requêtes enregistrées
    pub fn clear(&self) {
        self.state.requests.lock().unwrap().clear();
    }
}

impl Drop for MockMonitorEndpoint {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn record_request(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        body: body.to_vec(),
    };

    log::info!("📨 [MOCK] {} {}: {} bytes", request.method, request.path, request.body.len());
    state.requests.lock().unwrap().push(request);

    let response = state.response.lock().unwrap().clone();
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, [(header::CONTENT_TYPE, response.content_type)], response.body).into_response()
}

/// URL vers un port local fermé (pour simuler "connection refused")
pub async fn unreachable_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}{}", addr, MONITOR_PATH))
}
