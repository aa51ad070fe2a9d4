//! TCP listener serving the JSON API.

use super::api;
use super::error::ApiError;
use super::http::{self, ParseStatus, Request, Response};
use super::store::Store;
use crate::config::ServerConfig;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Shared store handle. Each request holds the lock for its whole
/// read-modify-write, on a blocking thread since saves touch the disk.
pub type SharedStore = Arc<Mutex<Store>>;

/// Open the data file and serve until the process exits.
pub async fn start_server(config: ServerConfig) -> std::io::Result<()> {
    let data_path = config.resolve_data_path()?;
    let store = Arc::new(Mutex::new(Store::open(data_path)));
    serve(config.port, store).await
}

/// Accept connections on `port` and answer each on its own task.
pub async fn serve(port: u16, store: SharedStore) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    log::info!("Parakeet server running on http://localhost:{}", port);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, store).await {
                        log::warn!("Connection error from {}: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                log::warn!("Accept error: {}", e);
            }
        }
    }
}

/// Read one request, answer it, and close the connection.
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    store: SharedStore,
) -> std::io::Result<()> {
    let request = match read_request(&mut stream).await? {
        Ok(Some(request)) => request,
        // Client hung up before sending a full request
        Ok(None) => return Ok(()),
        Err(error) => {
            log::debug!("Rejected request from {}: {}", addr, error);
            return write_response(&mut stream, &Response::from_error(&error)).await;
        }
    };

    let summary = format!("{} {}", request.method, request.path);
    let response = dispatch(store, request).await;

    log::info!("{} {} -> {}", addr, summary, response.status);
    write_response(&mut stream, &response).await
}

/// Route a request on a blocking thread so disk writes never stall the
/// async workers.
async fn dispatch(store: SharedStore, request: Request) -> Response {
    let joined = tokio::task::spawn_blocking(move || {
        // A handler that panicked never committed, so the data is still whole
        let mut store = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        api::handle(&mut store, &request)
    })
    .await;

    joined.unwrap_or_else(|e| {
        log::error!("request handler failed: {}", e);
        Response::from_error(&ApiError::Internal)
    })
}

async fn read_request(
    stream: &mut TcpStream,
) -> std::io::Result<Result<Option<Request>, ApiError>> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    loop {
        match http::parse_request(&buf) {
            Ok(ParseStatus::Complete(request)) => return Ok(Ok(Some(request))),
            Ok(ParseStatus::Incomplete) => {}
            Err(error) => return Ok(Err(error)),
        }

        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Ok(None));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

async fn write_response(stream: &mut TcpStream, response: &Response) -> std::io::Result<()> {
    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}
