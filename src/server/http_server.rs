//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::signal;
use log::{debug, info, warn, error};

use crate::parser::{find_head_end, parse_head, Error as ParserError, HttpRequest};
use crate::router::Router;
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};

/// An HTTP server that hands every request to a shared [`Router`].
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The routes, frozen for the lifetime of the server.
    pub router: Arc<Router>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and routes.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
        }
    }

    /// Log the registered endpoints.
    fn display_server_info(&self) {
        let base_path = self.router.base_path();
        info!("Registered endpoints ({count}):", count = self.router.table().len());
        for (method, path) in self.router.table().routes() {
            info!("  {method:<7} {base_path}{path}");
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>, tasks: &mut JoinSet<()>) {
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Handle a new connection.
    async fn handle_new_connection(
        &self,
        mut socket: tokio::net::TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::text(
                    StatusCode::ServiceUnavailable,
                    "Server is at capacity, please try again later",
                );
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        let router = self.router.clone();
        let read_buffer_size = self.config.read_buffer_size;
        let max_body_size = self.config.max_body_size;

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, &router, read_buffer_size, max_body_size).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Handle connection errors.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // For other errors, wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let _ = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        info!("Server shutdown complete");
    }

    /// Start the server and listen for incoming connections.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info();

        let listener = self.setup_listener().await?;
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let mut tasks = JoinSet::new();

        Self::setup_ctrl_c_handler(shutdown_tx.clone(), &mut tasks);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            self.handle_new_connection(socket, addr, &semaphore, &mut tasks).await;
                        },
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;

        Ok(())
    }

    /// Read one request: the head, then as many body bytes as Content-Length announces.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the peer closed the connection before sending anything
    async fn read_request(
        socket: &mut (impl AsyncRead + Unpin),
        read_buffer_size: usize,
        max_body_size: usize,
    ) -> Result<Option<HttpRequest>, Error> {
        let mut buf = Vec::with_capacity(read_buffer_size);
        let mut chunk = vec![0; read_buffer_size];

        let head_end = loop {
            if let Some(end) = find_head_end(&buf) {
                break end;
            }
            if buf.len() >= read_buffer_size {
                return Err(ParserError::HeadTooLarge(read_buffer_size).into());
            }

            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                if buf.is_empty() {
                    return Ok(None);
                }
                // Peer stopped sending; parse whatever head arrived
                break buf.len();
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let mut request = parse_head(&buf[..head_end])?;
        let length = request.content_length()?.unwrap_or(0);
        if length > max_body_size {
            return Err(Error::PayloadTooLarge { length, limit: max_body_size });
        }

        let total = head_end + length;
        while buf.len() < total {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                return Err(ParserError::IncompleteBody {
                    expected: length,
                    received: buf.len() - head_end,
                }
                .into());
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        request.body = buf[head_end..total].to_vec();
        Ok(Some(request))
    }

    /// Handle a single connection: read one request, dispatch it, write the response.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        router: &Router,
        read_buffer_size: usize,
        max_body_size: usize,
    ) -> Result<(), Error> {
        let request = match Self::read_request(&mut *socket, read_buffer_size, max_body_size).await {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()), // Connection closed
            Err(e) => {
                // Only errors about the request itself get a reply
                if !matches!(e, Error::IoError(_)) {
                    socket.write_all(&e.to_response().to_bytes()).await?;
                }
                return Err(e);
            }
        };

        debug!("{} {} ({} body bytes)", request.method, request.target, request.body.len());
        let response = router.dispatch(&request).await;
        socket.write_all(&response.to_bytes()).await?;

        Ok(())
    }
}
