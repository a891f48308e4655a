//! HTTP endpoint for dashboard consumers.
//!
//! Every `/api/analytics` request reloads the tables from disk; nothing is
//! cached or shared between requests.

use crate::analysis::model_fixtures;
use crate::source::DataSource;
use anyhow::{anyhow, Context, Result};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info};

pub type ResponseBody = BoxBody<Bytes, std::io::Error>;

static NOTFOUND: &[u8] = b"Not found";

/// Body returned when the report cannot be built.
pub const LOAD_FAILURE: &str = "Failed to load analytics data";

/// Route a request.
pub async fn handle_request<B>(
    req: Request<B>,
    source: &DataSource,
) -> Result<Response<ResponseBody>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    info!(%method, %path, "request");

    match (&method, path.as_str()) {
        (&Method::GET, "/api/analytics") => handle_analytics(source).await,
        (&Method::GET, "/api/models") => json_response(StatusCode::OK, &model_fixtures()),
        (&Method::GET, "/healthz") => json_response(StatusCode::OK, &json!({ "status": "ok" })),
        _ => {
            info!("{} Request to unknown endpoint: {}", method, path);
            not_found()
        }
    }
}

async fn handle_analytics(source: &DataSource) -> Result<Response<ResponseBody>> {
    let start = Instant::now();

    match source.report().await {
        Ok(report) => {
            info!(
                districts = report.summary.total_districts,
                elapsed = ?start.elapsed(),
                "served analytics report"
            );
            json_response(StatusCode::OK, &report)
        }
        Err(e) => {
            error!("Error loading analytics data: {}", e);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": LOAD_FAILURE }),
            )
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<ResponseBody>> {
    let bytes = serde_json::to_vec(body).unwrap_or_else(|e| {
        error!("Failed to serialize response: {e}");
        b"Internal server error".to_vec()
    });

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(bytes.into()).map_err(|e| match e {}).boxed())
        .map_err(|e| anyhow!("Failed to build response: {}", e))
}

fn not_found() -> Result<Response<ResponseBody>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Full::new(NOTFOUND.into()).map_err(|e| match e {}).boxed())
        .map_err(|e| anyhow!("Failed to build not found response: {}", e))
}

fn internal_error() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body(
            Full::new(Bytes::from(&b"Internal Server Error"[..]))
                .map_err(|e| match e {})
                .boxed(),
        )
        .unwrap_or_else(|_| {
            Response::new(
                Full::new(Bytes::from(&b"Error"[..]))
                    .map_err(|e| match e {})
                    .boxed(),
            )
        })
}

/// Bind the listening socket.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))
}

/// Accept connections until SIGINT or SIGTERM.
pub async fn serve(listener: TcpListener, source: DataSource) -> Result<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("Received SIGINT, shutting down"),
        }
    };

    serve_until(listener, source, shutdown).await
}

/// Accept connections until `shutdown` resolves. The listener is dropped on
/// return; connections already accepted finish on their own tasks.
pub async fn serve_until(
    listener: TcpListener,
    source: DataSource,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    info!("Listening on http://{}", listener.local_addr()?);
    let source = Arc::new(source);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                let (stream, peer) = match accept_result {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Failed to accept connection: {e}");
                        continue;
                    }
                };
                debug!(%peer, "accepted connection");

                let io = TokioIo::new(stream);
                let source = Arc::clone(&source);

                tokio::task::spawn(async move {
                    let service = service_fn(move |req| {
                        let source = Arc::clone(&source);
                        async move {
                            Ok::<_, anyhow::Error>(
                                handle_request(req, &source).await.unwrap_or_else(|e| {
                                    error!("Request handling failed: {e}");
                                    internal_error()
                                }),
                            )
                        }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection: {err}");
                    }
                });
            }
            () = &mut shutdown => {
                return Ok(());
            }
        }
    }
}
