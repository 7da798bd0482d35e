//! TCP transport for a [`Dispatcher`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::parser::{head_bounds, parse_request};
use crate::server::config::ServerConfig;
use crate::server::dispatcher::Dispatcher;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};

/// Serves a [`Dispatcher`] over TCP, one request per connection.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Create a server for a fully registered dispatcher.
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Log the registered endpoints.
    fn display_server_info(&self) {
        info!("Registered endpoints:");
        for route in self.dispatcher.routes() {
            let methods = route
                .methods()
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            info!("  {methods} {}", route.path());
        }
        let names = self.dispatcher.middleware().names();
        if !names.is_empty() {
            info!("Middleware: {}", names.join(" -> "));
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Spawn a task for a connection if a slot is free, otherwise answer 503.
    ///
    /// Errors on one connection are logged and stay with that connection.
    async fn handle_new_connection(
        &self,
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match Arc::clone(semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::new(StatusCode::ServiceUnavailable)
                    .with_content_type("text/plain")
                    .with_body_string("Server is at capacity, please try again later");
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        let read_buffer_size = self.config.read_buffer_size;

        tasks.spawn(async move {
            // Released when the connection task ends.
            let _permit = permit;

            match Self::handle_connection(&mut socket, &dispatcher, read_buffer_size).await {
                Ok(()) => {}
                Err(Error::IoError(e)) => warn!("Connection from {addr} dropped: {e}"),
                Err(e) => debug!("Rejected request from {addr}: {e}"),
            }
        });
    }

    /// Returns true when the accept loop should stop.
    async fn handle_accept_error(e: &std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Wait up to 30 seconds for open connections to finish.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let drained = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown timed out with {len} connections still open", len = tasks.len());
            tasks.abort_all();
        }
        info!("Server shutdown complete");
    }

    /// Bind the configured address and serve until Ctrl+C.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info();

        let listener = self.setup_listener().await?;
        self.serve_with_shutdown(listener, ctrl_c()).await
    }

    /// Serve connections from `listener` until `shutdown` completes.
    ///
    /// Only a fatal accept error ends the loop early; failures on individual
    /// connections never do. Open connections get up to 30 seconds to finish.
    pub async fn serve_with_shutdown<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut tasks = JoinSet::new();
        let mut outcome = Ok(());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down server...");
                    break;
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!("Connection task failed: {e}");
                    }
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            self.handle_new_connection(socket, addr, &semaphore, &mut tasks).await;
                        }
                        Err(e) => {
                            if Self::handle_accept_error(&e).await {
                                outcome = Err(Error::IoError(e));
                                break;
                            }
                        }
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;

        outcome
    }

    /// Read, dispatch and answer a single request.
    ///
    /// Malformed requests get a 400 and requests too large for
    /// `read_buffer_size` get a 413; either way the error is returned and
    /// nothing is dispatched. Every other outcome, including handler
    /// failures, is a response written to the socket and `Ok(())`.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        dispatcher: &Dispatcher,
        read_buffer_size: usize,
    ) -> Result<(), Error> {
        let raw = match read_request(socket, read_buffer_size).await {
            Ok(raw) => raw,
            Err(Error::PayloadTooLarge(limit)) => {
                let response = HttpResponse::new(StatusCode::PayloadTooLarge)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Request exceeds {limit} bytes"));
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::PayloadTooLarge(limit));
            }
            Err(e) => return Err(e),
        };
        if raw.is_empty() {
            return Ok(()); // Connection closed
        }

        let request = match parse_request(&raw) {
            Ok(req) => req,
            Err(e) => {
                let response = HttpResponse::new(StatusCode::BadRequest)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Error parsing request: {e}"));
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::ParseError(e));
            }
        };

        let method = request.method;
        let path = request.path.clone();
        let response = dispatcher.handle(request).await;
        debug!("{method} {path} -> {}", response.status.as_u16());

        socket.write_all(&response.to_bytes()).await?;
        socket.flush().await?;
        Ok(())
    }
}

/// Read one request: the head plus the body its `Content-Length` declares.
///
/// A request that cannot fit in `limit` bytes is refused with
/// [`Error::PayloadTooLarge`] before any of it is dispatched. A peer that
/// closes before the declared body has arrived is an I/O error. Bytes past
/// the declared body are ignored.
async fn read_request(socket: &mut (impl AsyncRead + Unpin), limit: usize) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    let mut chunk = vec![0; limit.clamp(1, 4096)];

    loop {
        match expected_len(&buf) {
            Some(total) if total > limit => return Err(Error::PayloadTooLarge(limit)),
            Some(total) if buf.len() >= total => {
                buf.truncate(total);
                return Ok(buf);
            }
            None if buf.len() >= limit => return Err(Error::PayloadTooLarge(limit)),
            _ => {}
        }

        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            if expected_len(&buf).is_some() {
                return Err(Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed before the request body was complete",
                )));
            }
            return Ok(buf);
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Total request length once the head has arrived: head, blank line and the
/// `Content-Length` body.
fn expected_len(buf: &[u8]) -> Option<usize> {
    let (head_end, body_start) = head_bounds(buf)?;

    let content_length = String::from_utf8_lossy(&buf[..head_end])
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("Content-Length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    Some(body_start.saturating_add(content_length))
}

/// Resolves on Ctrl+C. If the handler cannot be installed it never resolves.
async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(e) => {
            error!("Error setting up Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}
