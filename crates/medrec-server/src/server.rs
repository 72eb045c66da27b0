use std::net::SocketAddr;

use medrec_store::{InMemoryStore, SeedData};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// medrec API server.
pub struct MedrecServer {
    config: ServerConfig,
    state: AppState,
}

impl MedrecServer {
    /// Build a server over an in-memory store, seeded from
    /// `config.seed_path` when set.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = match &config.seed_path {
            Some(path) => {
                let seed = SeedData::from_file(path)?;
                tracing::info!(
                    path = %path.display(),
                    patients = seed.patients.len(),
                    "loaded seed data"
                );
                InMemoryStore::from_seed(seed)
            }
            None => InMemoryStore::new(),
        };
        let state = AppState::from_config(&config, store);
        Ok(Self { config, state })
    }

    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.cors_permissive)
    }

    /// Bind the configured address and serve requests.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve_on(listener).await
    }

    /// Serve requests on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> ServerResult<()> {
        let addr: SocketAddr = listener.local_addr()?;
        let app = self.router();
        tracing::info!("medrec server listening on {addr}");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrec_store::PatientStore;
    use std::io::Write;

    #[test]
    fn server_construction() {
        let server = MedrecServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:3001".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let server = MedrecServer::new(ServerConfig::default()).unwrap();
        let _router = server.router();
    }

    #[test]
    fn seed_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"diagnoses": [{"code": "J10.1", "name": "Influenza"}]}"#)
            .unwrap();
        let config = ServerConfig {
            seed_path: Some(file.path().to_path_buf()),
            ..ServerConfig::default()
        };
        let server = MedrecServer::new(config).unwrap();
        assert_eq!(server.state.store.list_diagnoses().unwrap().len(), 1);
    }

    #[test]
    fn missing_seed_fails() {
        let config = ServerConfig {
            seed_path: Some("/nonexistent/seed.json".into()),
            ..ServerConfig::default()
        };
        assert!(MedrecServer::new(config).is_err());
    }
}
