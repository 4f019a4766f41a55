#[cfg(test)]
#[path = "endpoint_test.rs"]
mod tests;

use crate::domain::models::KeyValueStore;

pub const BACKEND_PORT_STORE_KEY: &str = "backendPort";
pub const DEFAULT_BACKEND_PORT: u16 = 5000;

/// Address of the generation service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: &str, port: u16) -> Endpoint {
        return Endpoint {
            host: host.to_string(),
            port,
        };
    }

    pub fn base_url(&self) -> String {
        return format!("http://{}:{}", self.host, self.port);
    }

    pub fn generate_url(&self) -> String {
        return format!("{}/api/generate", self.base_url());
    }

    pub fn health_url(&self) -> String {
        return format!("{}/api/health", self.base_url());
    }
}

/// Picks the backend port: an explicitly requested port wins and is
/// remembered, then the remembered port, then the default.
pub fn resolve_backend_port(requested: Option<u16>, store: &mut dyn KeyValueStore) -> u16 {
    if let Some(port) = requested {
        if let Err(err) = store.set(BACKEND_PORT_STORE_KEY, &port.to_string()) {
            tracing::warn!(error = ?err, port, "Failed to remember backend port");
        }
        return port;
    }

    if let Some(stored) = store.get(BACKEND_PORT_STORE_KEY) {
        match stored.trim().parse::<u16>() {
            Ok(port) => return port,
            Err(_) => {
                tracing::warn!(stored = stored.as_str(), "Ignoring invalid stored backend port");
            }
        }
    }

    return DEFAULT_BACKEND_PORT;
}
