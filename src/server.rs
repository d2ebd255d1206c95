//! The HTTP front: a router serving the rendered pages, the landing
//! redirect, the static assets and the not-found page.
//!
//! | Request                   | Response                                     |
//! |---------------------------|----------------------------------------------|
//! | `GET /`                   | `301` to `/<landing path>`                   |
//! | `GET <static prefix>/...` | the file from the static directory           |
//! | `GET /<slug>`             | `200` with the rendered document             |
//! | anything else             | `404` with the rendered not-found page       |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::site::{self, Rendered, Site};

// Characters escaped in the redirect target. `/` is kept so nested slugs
// stay paths; non-ASCII is always escaped.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builds the application router for a loaded site.
pub fn router(site: Arc<Site>, config: &Config) -> Router {
    let static_prefix = config.static_url_prefix.trim_end_matches('/');
    Router::new()
        .route("/", get(redirect_to_landing).fallback(not_found))
        .nest_service(static_prefix, ServeDir::new(&config.static_directory))
        .fallback(page)
        .layer(TraceLayer::new_for_http())
        .with_state(site)
}

async fn redirect_to_landing(State(site): State<Arc<Site>>) -> Response {
    let location = format!("/{}", utf8_percent_encode(site.landing_path(), PATH));
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

// Every path other than the root and the static prefix ends up here, so
// unmatched paths get the not-found page rather than an empty 404. Slugs are
// matched against the percent-decoded path.
async fn page(
    State(site): State<Arc<Site>>,
    method: Method,
    uri: Uri,
) -> Result<Response, ServerError> {
    if method != Method::GET && method != Method::HEAD {
        return not_found(State(site)).await;
    }
    let path = match percent_decode_str(uri.path()).decode_utf8() {
        Ok(path) => path,
        Err(_) => return not_found(State(site)).await,
    };
    Ok(match site.render(&path)? {
        Rendered::Page(html) => (StatusCode::OK, Html(html)).into_response(),
        Rendered::NotFound(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
    })
}

async fn not_found(State(site): State<Arc<Site>>) -> Result<Response, ServerError> {
    let html = site.render_not_found()?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

/// Loads the site described by `config` and serves it until Ctrl-C.
pub async fn serve(config: Config) -> Result<(), Error> {
    let site = Arc::new(Site::build(&config)?);
    let app = router(site, &config);

    let address = format!("{}:{}", config.host, config.port);
    let addr: SocketAddr = address
        .parse()
        .map_err(|_| Error::Address(address.clone()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| Error::Bind { address, err })?;
    tracing::info!(address = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received, stopping server"),
        Err(err) => {
            // Without a signal handler the server runs until killed.
            tracing::error!(error = %err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}

/// Represents a failure to start or run the server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the site can't be loaded.
    #[error(transparent)]
    Site(#[from] site::Error),

    /// Returned when `host:port` is not a socket address.
    #[error("invalid listen address `{0}`")]
    Address(String),

    /// Returned when the listener can't be bound.
    #[error("binding `{address}`: {err}")]
    Bind {
        address: String,
        err: std::io::Error,
    },

    /// Returned when the server stops with an I/O error.
    #[error("serving: {0}")]
    Serve(std::io::Error),
}

/// A request-time failure. Details are logged and the client only sees a
/// generic `500`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Site(#[from] site::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({"error": "Internal Server Error"})),
        )
            .into_response()
    }
}
