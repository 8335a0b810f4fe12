//! Server state and configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::editor::Editor;
use crate::error::TripcardError;
use crate::export::{Exporter, ImageResolver, RemoteImages};

/// Idle time after which an editing session is dropped (30 minutes).
pub const SESSION_EXPIRATION_SECS: u64 = 30 * 60;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Directory holding `images/`, served at `/images` and used for exports
    pub asset_dir: Option<PathBuf>,
    /// Origin used to absolutize background URLs in previews
    /// (defaults to `http://<listen_addr>`)
    pub public_origin: Option<String>,
    /// JSON catalog replacing the built-in layouts
    pub catalog_path: Option<PathBuf>,
    /// Hosts that remote background URLs may be downloaded from
    pub remote_image_hosts: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            asset_dir: None,
            public_origin: None,
            catalog_path: None,
            remote_image_hosts: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn origin(&self) -> String {
        match &self.public_origin {
            Some(origin) => origin.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.listen_addr),
        }
    }

    /// The configured catalog file, or the built-in layouts.
    pub fn load_catalog(&self) -> Result<Catalog, TripcardError> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::builtin()),
        }
    }
}

/// One browser tab's editor.
#[derive(Debug)]
pub struct EditorSession {
    pub editor: Editor,
    pub last_accessed: Instant,
}

impl EditorSession {
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            last_accessed: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Application state shared across handlers.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub catalog: Arc<Catalog>,
    pub sessions: RwLock<HashMap<Uuid, EditorSession>>,
    pub exporter: Exporter,
}

impl AppState {
    pub fn new(config: ServerConfig, catalog: Catalog) -> Result<Self, TripcardError> {
        let resolver = ImageResolver::new(config.asset_dir.clone())?
            .with_remote_images(RemoteImages::Hosts(config.remote_image_hosts.clone()));
        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            sessions: RwLock::new(HashMap::new()),
            exporter: Exporter::new(resolver),
        })
    }
}
