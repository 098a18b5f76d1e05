use std::path::PathBuf;

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use hyper::Request;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

/// Serves the built SPA bundle from disk.
///
/// Paths that match no asset fall back to the index document so client-side
/// routing keeps working on deep links.
#[derive(Debug, Clone)]
pub struct SpaBundle {
    root: PathBuf,
}

impl SpaBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn serve(&self, req: Request<Body>) -> Response {
        let index = self.root.join("index.html");
        let service = ServeDir::new(&self.root).fallback(ServeFile::new(index));
        match service.oneshot(req).await {
            Ok(response) => response.map(Body::new).into_response(),
            Err(err) => match err {},
        }
    }
}
