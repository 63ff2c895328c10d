// src/server/mod.rs

//! Local development server with live reload.
//!
//! Serves the build-output root over HTTP. HTML responses (files and
//! directory listings) get a small client script injected that listens on
//! a server-sent-events stream; [`DevServer::reload`] pushes a `reload`
//! event to every connected page.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch, OnceCell};
use tracing::{error, info, warn};

use crate::config::{PathConfig, ServerSection};
use crate::errors::Result;

pub mod inject;
pub mod listing;
pub mod routes;

pub use routes::{router, AppState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub root: PathBuf,
    pub host: String,
    /// `0` picks a free port.
    pub port: u16,
    pub directory_listing: bool,
}

impl ServerOptions {
    pub fn from_config(section: &ServerSection, paths: &PathConfig) -> Self {
        Self {
            root: paths.dest_root().to_path_buf(),
            host: section.host.clone(),
            port: section.port,
            directory_listing: section.directory_listing,
        }
    }
}

/// A dev server that is started at most once per process.
#[derive(Debug)]
pub struct DevServer {
    options: ServerOptions,
    reload_tx: broadcast::Sender<u64>,
    version: AtomicU64,
    addr: OnceCell<SocketAddr>,
    shutdown_tx: watch::Sender<bool>,
}

impl DevServer {
    pub fn new(options: ServerOptions) -> Self {
        Self {
            options,
            reload_tx: broadcast::channel(64).0,
            version: AtomicU64::new(0),
            addr: OnceCell::new(),
            shutdown_tx: watch::channel(false).0,
        }
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Bind and start serving. Later calls return the existing address.
    pub async fn start(&self) -> Result<SocketAddr> {
        let addr = self.addr.get_or_try_init(|| self.bind_and_serve()).await?;
        Ok(*addr)
    }

    async fn bind_and_serve(&self) -> Result<SocketAddr> {
        let ServerOptions {
            root,
            host,
            port,
            directory_listing,
        } = &self.options;

        let listener = TcpListener::bind((host.as_str(), *port))
            .await
            .with_context(|| format!("binding dev server to {host}:{port}"))?;
        let addr = listener.local_addr()?;

        let app = router(AppState {
            root: Arc::new(root.clone()),
            directory_listing: *directory_listing,
            reload_tx: self.reload_tx.clone(),
        });

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.wait_for(|stop| *stop).await;
                })
                .await;
            if let Err(e) = served {
                error!(error = %e, "dev server stopped with error");
            }
        });

        info!(url = %format!("http://{addr}/"), root = ?root, "dev server listening");
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr.get().copied()
    }

    pub fn is_running(&self) -> bool {
        self.addr.initialized()
    }

    /// Tell every connected page to reload. Returns how many were told.
    ///
    /// Before [`start`](Self::start) this only logs a warning.
    pub fn reload(&self) -> usize {
        if !self.is_running() {
            warn!("reload requested before the dev server started; ignoring");
            return 0;
        }
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let clients = self.reload_tx.send(version).unwrap_or(0);
        info!(clients, version, "reload broadcast");
        clients
    }

    pub fn shutdown(&self) {
        if self.is_running() {
            info!("stopping dev server");
        }
        self.shutdown_tx.send_replace(true);
    }
}
