//! HTTP liveness endpoint for the oxo server.
//!
//! Serves `GET /health` on its own port from a background thread so
//! orchestrators and monitoring probes can check the process without
//! speaking the game protocol. Carries no game state.

use std::thread::{self, JoinHandle};

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("failed to bind health endpoint to port {port}: {error}")]
    Bind { port: u16, error: String },
}

/// Fixed-shape liveness payload.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    message: String,
}

/// HTTP server for the liveness endpoint.
/// Runs on a background thread to stay clear of the async runtime.
pub struct HealthServer {
    port: u16,
    actual_port: Option<u16>,
    handle: Option<JoinHandle<()>>,
}

impl HealthServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            actual_port: None,
            handle: None,
        }
    }

    /// Bind the endpoint and start serving requests in the background.
    pub fn start(&mut self) -> Result<(), HealthError> {
        let server = Server::http(format!("0.0.0.0:{}", self.port)).map_err(|e| HealthError::Bind {
            port: self.port,
            error: e.to_string(),
        })?;

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);
        tracing::info!("health endpoint listening on port {actual_port}");

        let handle = thread::spawn(move || {
            Self::run_server(server);
        });

        self.handle = Some(handle);
        Ok(())
    }

    pub fn stop(&mut self) {
        // tiny_http doesn't support graceful shutdown, so we just detach
        // the thread; it terminates with the process.
        if let Some(handle) = self.handle.take() {
            // Don't join: the thread may be blocked in incoming_requests()
            std::mem::forget(handle);
        }
    }

    /// The bound port. Differs from the requested port when binding to 0.
    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    fn run_server(server: Server) {
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request) {
                tracing::warn!("health endpoint error: {e}");
            }
        }
    }

    fn handle_request(
        request: Request,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Route on the bare path; callers may append query strings.
        let url = request.url();
        let path = url.split_once('?').map_or(url, |(path, _)| path);
        let response = match (request.method(), path) {
            (&Method::Get, "/health") => {
                let payload = HealthResponse {
                    status: "ok".to_string(),
                    message: "oxo server is running".to_string(),
                };
                let json = serde_json::to_string(&payload)?;
                Response::from_string(json).with_header(
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                )
            }
            _ => Response::from_string("Not Found").with_status_code(404),
        };

        request.respond(response)?;
        Ok(())
    }
}

impl Drop for HealthServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn start_on_ephemeral_port() -> HealthServer {
        let mut server = HealthServer::new(0); // port 0 = OS assigns
        server.start().unwrap();
        // Give the background thread a moment to start
        thread::sleep(Duration::from_millis(100));
        server
    }

    #[test]
    fn test_health_endpoint_responds_ok() {
        let mut server = start_on_ephemeral_port();

        let port = server.actual_port();
        let resp = ureq::get(&format!("http://localhost:{}/health", port))
            .call()
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.header("Content-Type").unwrap(), "application/json");

        let body_text = resp.into_string().unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_text).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "oxo server is running");
        server.stop();
    }

    #[test]
    fn test_actual_port_resolves_after_start() {
        let mut server = start_on_ephemeral_port();
        assert_ne!(server.actual_port(), 0, "OS should assign a real port");
        server.stop();
    }

    #[test]
    fn test_unknown_path_returns_404() {
        let mut server = start_on_ephemeral_port();

        let port = server.actual_port();
        let resp = ureq::get(&format!("http://localhost:{}/nonexistent", port)).call();

        // ureq surfaces 4xx as an error variant
        assert!(resp.is_err());
        if let Err(ureq::Error::Status(code, _)) = resp {
            assert_eq!(code, 404);
        } else {
            panic!("expected a 404 status error");
        }

        server.stop();
    }

    #[test]
    fn test_health_ignores_query_strings() {
        let mut server = start_on_ephemeral_port();

        // A query string does not change the routed path.
        let port = server.actual_port();
        let resp = ureq::get(&format!("http://localhost:{}/health?verbose=1", port))
            .call()
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
        assert_eq!(body["status"], "ok");

        server.stop();
    }
}
