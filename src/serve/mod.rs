//! Development preview server
//!
//! Serves the development output root over HTTP/1.1 on loopback and keeps a
//! server-sent-events endpoint open for reload notifications. HTML responses
//! get the reload client appended at serve time; files on disk are untouched.

pub mod reload;

pub use reload::{ReloadEvent, ReloadHub};

use crate::config::Config;
use crate::config::constants::{PREVIEW_HOST, RELOAD_ENDPOINT};
use crate::error::{BuildError, Result};
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Frame, Incoming};
use hyper::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

type Body = UnsyncBoxBody<Bytes, Infallible>;

const RELOAD_MARKER: &str = "data-assetflow-reload";

pub struct PreviewServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    root: Arc<PathBuf>,
    hub: ReloadHub,
}

impl PreviewServer {
    /// Bind the configured port on loopback, serving the development root
    pub async fn bind(config: &Config, hub: ReloadHub) -> Result<Self> {
        let addr = SocketAddr::from((PREVIEW_HOST, config.runtime.port()));
        Self::bind_addr(addr, config.paths.dist.base.clone(), hub).await
    }

    pub async fn bind_addr(addr: SocketAddr, root: PathBuf, hub: ReloadHub) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BuildError::server(format!("cannot bind {addr}: {e}")))?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            root: Arc::new(root),
            hub,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until the task is dropped
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept preview connection: {}", e);
                    continue;
                }
            };
            debug!("Preview connection from {}", peer);

            let io = TokioIo::new(stream);
            let root = Arc::clone(&self.root);
            let hub = self.hub.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let root = Arc::clone(&root);
                    let hub = hub.clone();
                    async move { Ok::<_, Infallible>(handle(req, &root, &hub).await) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Preview connection closed: {}", e);
                }
            });
        }
    }
}

async fn handle(req: Request<Incoming>, root: &Path, hub: &ReloadHub) -> Response<Body> {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return status(StatusCode::METHOD_NOT_ALLOWED);
    }

    let path = req.uri().path();
    if path == RELOAD_ENDPOINT {
        return event_stream(hub);
    }

    let Some(file) = resolve(root, path) else {
        return status(StatusCode::FORBIDDEN);
    };
    let file = if file.is_dir() {
        file.join("index.html")
    } else {
        file
    };

    let contents = match tokio::fs::read(&file).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return status(StatusCode::NOT_FOUND);
        }
        Err(e) => {
            warn!("Failed to read {}: {}", file.display(), e);
            return status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    let body = if mime.essence_str() == "text/html" {
        inject_reload_script(&String::from_utf8_lossy(&contents)).into_bytes()
    } else {
        contents
    };

    let mut response = Response::new(Full::new(Bytes::from(body)).boxed_unsync());
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

/// Map a request path under `root`; `None` when it would escape the root.
///
/// The path is percent-decoded before it is split, so encoded dot segments
/// are caught too.
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();
    if decoded.contains('\0') {
        return None;
    }

    let mut file = root.to_path_buf();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => file.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(file)
}

fn event_stream(hub: &ReloadHub) -> Response<Body> {
    let (rx, guard) = hub.connect();
    debug!("Reload client connected ({} total)", hub.client_count());

    let hello = stream::once(async { Ok::<_, Infallible>(Frame::data(Bytes::from_static(b": connected\n\n"))) });
    let events = BroadcastStream::new(rx).map(move |_| {
        // the guard lives as long as the stream
        let _ = &guard;
        Ok::<_, Infallible>(Frame::data(Bytes::from_static(b"data: reload\n\n")))
    });

    let mut response = Response::new(StreamBody::new(hello.chain(events)).boxed_unsync());
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

fn status(code: StatusCode) -> Response<Body> {
    let reason = code.canonical_reason().unwrap_or("");
    let mut response = Response::new(Full::new(Bytes::from(reason)).boxed_unsync());
    *response.status_mut() = code;
    response
}

/// Append the reload client before `</body>`, or at the end without one
pub fn inject_reload_script(html: &str) -> String {
    if html.contains(RELOAD_MARKER) {
        return html.to_string();
    }

    let script = format!(
        "<script {RELOAD_MARKER}>new EventSource(\"{RELOAD_ENDPOINT}\").onmessage=function(){{location.reload()}};</script>"
    );

    let mut out = String::with_capacity(html.len() + script.len());
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => {
            out.push_str(&html[..idx]);
            out.push_str(&script);
            out.push_str(&html[idx..]);
        }
        None => {
            out.push_str(html);
            out.push_str(&script);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let html = inject_reload_script("<html><body><p>x</p></BODY></html>");
        let script_at = html.find("<script").unwrap();
        assert!(script_at < html.find("</BODY>").unwrap());
        assert!(html.contains("/__reload"));
    }

    #[test]
    fn test_inject_without_body_appends() {
        let html = inject_reload_script("<p>fragment</p>");
        assert!(html.starts_with("<p>fragment</p><script"));
    }

    #[test]
    fn test_inject_is_idempotent() {
        let once = inject_reload_script("<body></body>");
        assert_eq!(inject_reload_script(&once), once);
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let root = Path::new("/site/dist");
        assert_eq!(resolve(root, "/"), Some(PathBuf::from("/site/dist")));
        assert_eq!(
            resolve(root, "/css/style.css"),
            Some(PathBuf::from("/site/dist/css/style.css"))
        );
        assert_eq!(resolve(root, "/../secret"), None);
        assert_eq!(resolve(root, "/a/../../b"), None);
    }

    #[test]
    fn test_resolve_decodes_percent_escapes() {
        let root = Path::new("/site/dist");
        assert_eq!(
            resolve(root, "/img/my%20photo.jpg"),
            Some(PathBuf::from("/site/dist/img/my photo.jpg"))
        );
        assert_eq!(
            resolve(root, "/img/caf%C3%A9.png"),
            Some(PathBuf::from("/site/dist/img/café.png"))
        );
        assert_eq!(resolve(root, "/%2e%2e/secret"), None);
        assert_eq!(resolve(root, "/img%2F..%2F..%2Fsecret"), None);
        assert_eq!(resolve(root, "/a%00b"), None);
    }
}
