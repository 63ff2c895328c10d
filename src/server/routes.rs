// src/server/routes.rs

use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use percent_encoding::percent_decode_str;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::server::inject::{inject_client_script, CLIENT_JS, CLIENT_PATH, EVENTS_PATH};
use crate::server::listing::{read_listing, render_listing};

#[derive(Debug, Clone)]
pub struct AppState {
    pub root: Arc<PathBuf>,
    pub directory_listing: bool,
    pub reload_tx: broadcast::Sender<u64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(EVENTS_PATH, get(reload_events))
        .route(CLIENT_PATH, get(client_script))
        .fallback(serve_site)
        .with_state(state)
}

/// One `connected` event, then a `reload` event per broadcast.
async fn reload_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.reload_tx.subscribe();
    debug!(clients = state.reload_tx.receiver_count(), "reload client connected");

    let connected = tokio_stream::once(Ok::<_, Infallible>(
        Event::default().event("connected").data("ok"),
    ));
    // A lagged receiver still only needs to reload once.
    let reloads = BroadcastStream::new(rx).map(|msg| {
        let version = msg.map(|v| v.to_string()).unwrap_or_else(|_| "lagged".to_string());
        Ok::<_, Infallible>(Event::default().event("reload").data(version))
    });

    Sse::new(connected.chain(reloads)).keep_alive(KeepAlive::default())
}

async fn client_script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CLIENT_JS,
    )
        .into_response()
}

async fn serve_site(State(state): State<AppState>, req: Request) -> Response {
    let raw = req.uri().path().to_string();
    let Some(url_path) = percent_decode(&raw) else {
        return (StatusCode::BAD_REQUEST, "invalid path").into_response();
    };
    let Some(rel) = sanitize_rel_path(&url_path) else {
        debug!(path = %url_path, "request escapes the served root");
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };
    let full = state.root.join(&rel);

    let meta = match tokio::fs::metadata(&full).await {
        Ok(meta) => meta,
        Err(_) => return serve_dir(&state.root, req).await,
    };

    if meta.is_dir() {
        if !raw.ends_with('/') {
            return Redirect::permanent(&format!("{raw}/")).into_response();
        }
        if state.directory_listing {
            return match read_listing(&full).await {
                Ok(entries) => Html(render_listing(&url_path, &entries)).into_response(),
                Err(e) => internal_error(&full, e),
            };
        }
        let index = full.join("index.html");
        if tokio::fs::metadata(&index).await.map(|m| m.is_file()).unwrap_or(false) {
            return serve_html(&index).await;
        }
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }

    if is_html(&full) {
        return serve_html(&full).await;
    }
    serve_dir(&state.root, req).await
}

async fn serve_html(path: &Path) -> Response {
    match tokio::fs::read_to_string(path).await {
        Ok(html) => Html(inject_client_script(&html)).into_response(),
        Err(e) => internal_error(path, e),
    }
}

async fn serve_dir(root: &Path, req: Request) -> Response {
    match ServeDir::new(root).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}

fn internal_error(path: &Path, e: std::io::Error) -> Response {
    warn!(path = ?path, error = %e, "failed to serve path");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("failed to read {}: {e}", path.display()),
    )
        .into_response()
}

fn is_html(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("html") | Some("htm")
    )
}

/// Relative path under the served root, or `None` if it would escape it.
pub fn sanitize_rel_path(path: &str) -> Option<PathBuf> {
    let rel = PathBuf::from(path.trim_start_matches('/'));
    for comp in rel.components() {
        if matches!(
            comp,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        ) {
            return None;
        }
    }
    Some(rel)
}

/// Decode `%XX` escapes; `None` when the result is not UTF-8.
pub fn percent_decode(path: &str) -> Option<String> {
    percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_components_are_rejected() {
        assert!(sanitize_rel_path("/../etc/passwd").is_none());
        assert!(sanitize_rel_path("/css/../../x").is_none());
        assert_eq!(sanitize_rel_path("/css/index.css"), Some(PathBuf::from("css/index.css")));
        assert_eq!(sanitize_rel_path("/"), Some(PathBuf::new()));
    }

    #[test]
    fn percent_escapes_are_decoded() {
        assert_eq!(percent_decode("/my%20dir/").as_deref(), Some("/my dir/"));
        assert_eq!(percent_decode("/%2e%2e/").as_deref(), Some("/../"));
        assert!(percent_decode("/%ff%fe").is_none());
        // Malformed escapes are kept literally and simply miss on disk.
        assert_eq!(percent_decode("/bad%zz").as_deref(), Some("/bad%zz"));
    }
}
