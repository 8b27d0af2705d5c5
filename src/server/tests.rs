//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    use crate::parser::{Error as ParserError, Method};
    use crate::router::{DecodedBody, RequestContext, Router};
    use crate::server::{Error, HttpResponse, HttpServer, ServerConfig, StatusCode};

    // Mock TcpStream for testing
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
        max_read: usize,
    }

    impl MockTcpStream {
        fn new(read_data: Vec<u8>) -> Self {
            Self::chunked(read_data, usize::MAX)
        }

        /// Serve at most `max_read` bytes per read, like a slow peer.
        fn chunked(read_data: Vec<u8>, max_read: usize) -> Self {
            Self {
                read_data: Cursor::new(read_data),
                write_data: Vec::new(),
                max_read,
            }
        }

        fn written(&self) -> String {
            String::from_utf8_lossy(&self.write_data).into_owned()
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let unfilled = buf.initialize_unfilled();
            let limit = unfilled.len().min(this.max_read);
            let n = std::io::Read::read(&mut this.read_data, &mut unfilled[..limit])?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            this.write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn test_router() -> Router {
        let mut router = Router::new();
        router.get("/test", |_ctx| async {
            Ok(HttpResponse::text(StatusCode::Ok, "Test response"))
        });
        router.post("/echo", |ctx| async move {
            HttpResponse::new(StatusCode::Ok).with_json(&ctx.body)
        });
        router
    }

    async fn serve(router: &Router, stream: &mut MockTcpStream) -> Result<(), Error> {
        let config = ServerConfig::default();
        HttpServer::handle_connection(stream, router, config.read_buffer_size, config.max_body_size).await
    }

    #[test]
    fn test_server_creation() {
        let config = ServerConfig {
            addr: "127.0.0.1:9090".parse().unwrap(),
            max_connections: 100,
            read_buffer_size: 4096,
            max_body_size: 512,
        };

        let server = HttpServer::new(config.clone(), test_router());
        assert_eq!(server.config.addr, config.addr);
        assert_eq!(server.config.max_connections, 100);
        assert_eq!(server.config.max_body_size, 512);
        assert_eq!(server.router.table().len(), 2);
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.max_connections, 1024);
        assert_eq!(config.read_buffer_size, 8192);
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[tokio::test]
    async fn test_handle_connection_with_valid_request() {
        let mut stream = MockTcpStream::new(b"GET /test HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());

        let result = serve(&test_router(), &mut stream).await;
        assert!(result.is_ok());

        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.contains("Content-Length: 13\r\n"));
        assert!(response.ends_with("\r\n\r\nTest response"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_not_found() {
        let mut stream = MockTcpStream::new(b"GET /nonexistent HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());

        let result = serve(&test_router(), &mut stream).await;
        assert!(result.is_ok());

        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.contains("No route for GET /nonexistent"));
    }

    #[tokio::test]
    async fn test_wrong_method_is_not_found() {
        let mut stream = MockTcpStream::new(b"POST /test HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());

        serve(&test_router(), &mut stream).await.unwrap();
        assert!(stream.written().starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_invalid_request() {
        let mut stream = MockTcpStream::new(b"INVALID REQUEST\r\n\r\n".to_vec());

        let result = serve(&test_router(), &mut stream).await;
        assert!(matches!(result, Err(Error::ParseError(_))));

        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("Parse error:"));
    }

    #[tokio::test]
    async fn test_closed_connection_writes_nothing() {
        let mut stream = MockTcpStream::new(Vec::new());

        let result = serve(&test_router(), &mut stream).await;
        assert!(result.is_ok());
        assert!(stream.written().is_empty());
    }

    #[tokio::test]
    async fn test_body_arriving_in_pieces() {
        let request = b"POST /echo HTTP/1.1\r\n\
            Host: localhost\r\n\
            Content-Type: application/x-www-form-urlencoded\r\n\
            Content-Length: 17\r\n\
            \r\n\
            name=Alice&age=30";
        let mut stream = MockTcpStream::chunked(request.to_vec(), 7);

        serve(&test_router(), &mut stream).await.unwrap();

        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: application/json\r\n"));
        let body = response.split("\r\n\r\n").nth(1).unwrap();
        let echoed: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(echoed, serde_json::json!({"name": "Alice", "age": "30"}));
    }

    #[tokio::test]
    async fn test_lf_head_with_crlf_multipart_body() {
        let mut request = b"POST /echo HTTP/1.1\n\
            Host: localhost\n\
            Content-Type: multipart/form-data; boundary=XYZ\n\
            Content-Length: 74\n\n"
            .to_vec();
        request.extend_from_slice(b"--XYZ\r\nContent-Disposition: form-data; name=\"greeting\"\r\n\r\nhello\r\n--XYZ--\r\n");
        let mut stream = MockTcpStream::new(request);

        serve(&test_router(), &mut stream).await.unwrap();

        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("\r\n\r\n{\"greeting\":\"hello\"}"));
    }

    #[tokio::test]
    async fn test_truncated_body_is_rejected() {
        let request = b"POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 50\r\n\r\nshort";
        let mut stream = MockTcpStream::new(request.to_vec());

        let result = serve(&test_router(), &mut stream).await;
        assert!(matches!(
            result,
            Err(Error::ParseError(ParserError::IncompleteBody { expected: 50, received: 5 }))
        ));
        assert!(stream.written().starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_payload_too_large() {
        let request = b"POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 100\r\n\r\n";
        let mut stream = MockTcpStream::new(request.to_vec());

        let result = HttpServer::handle_connection(&mut stream, &test_router(), 1024, 10).await;
        assert!(matches!(result, Err(Error::PayloadTooLarge { length: 100, limit: 10 })));
        assert!(stream.written().starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
    }

    #[tokio::test]
    async fn test_head_too_large() {
        let mut request = b"GET /test HTTP/1.1\r\nHost: localhost\r\nX-Padding: ".to_vec();
        request.extend(std::iter::repeat(b'a').take(200));
        request.extend_from_slice(b"\r\n\r\n");
        let mut stream = MockTcpStream::chunked(request, 16);

        let result = HttpServer::handle_connection(&mut stream, &test_router(), 64, 1024).await;
        assert!(matches!(result, Err(Error::ParseError(ParserError::HeadTooLarge(64)))));
        assert!(stream.written().starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_base_path_and_json_end_to_end() {
        let calls: Arc<Mutex<Vec<RequestContext>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();

        let mut router = Router::with_base_path("/api");
        router.post("/users", move |ctx| {
            let recorded = recorded.clone();
            async move {
                recorded.lock().unwrap().push(ctx);
                Ok(HttpResponse::text(StatusCode::Created, "created"))
            }
        });

        let request = b"POST /api/users?debug=1 HTTP/1.1\r\n\
            Host: localhost\r\n\
            Content-Type: application/json\r\n\
            Content-Length: 14\r\n\
            \r\n\
            {\"name\":\"Bob\"}";
        let mut stream = MockTcpStream::new(request.to_vec());

        serve(&router, &mut stream).await.unwrap();
        assert!(stream.written().starts_with("HTTP/1.1 201 Created\r\n"));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].param("debug"), Some("1"));
        assert_eq!(calls[0].params.len(), 1);
        assert_eq!(calls[0].body, DecodedBody::Json(serde_json::json!({"name": "Bob"})));
    }

    #[test]
    fn test_error_status_mapping() {
        let not_found = Error::RouteNotFound { method: Method::GET, path: "/x".to_string() };
        assert_eq!(not_found.status(), StatusCode::NotFound);
        assert_eq!(not_found.to_response().body_text(), "No route for GET /x");

        assert_eq!(Error::ParseError(ParserError::EmptyRequest).status(), StatusCode::BadRequest);
        assert_eq!(Error::PayloadTooLarge { length: 2, limit: 1 }.status(), StatusCode::PayloadTooLarge);
        assert_eq!(Error::ScriptError("x".to_string()).status(), StatusCode::InternalServerError);
        assert_eq!(Error::InternalError("x".to_string()).status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_response_to_bytes() {
        let response = HttpResponse::new(StatusCode::Accepted)
            .with_header("X-Custom", "yes")
            .with_body_string("ok");

        let bytes = String::from_utf8(response.to_bytes()).unwrap();
        assert_eq!(
            bytes,
            "HTTP/1.1 202 Accepted\r\nContent-Length: 2\r\nServer: microroute\r\nX-Custom: yes\r\n\r\nok"
        );
        assert_eq!(response.header("X-Custom"), Some("yes"));
        assert_eq!(StatusCode::PayloadTooLarge.as_u16(), 413);
    }

    #[test]
    fn test_response_with_json() {
        let response = HttpResponse::new(StatusCode::Ok)
            .with_json(&serde_json::json!({"ok": true}))
            .unwrap();
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body_text(), r#"{"ok":true}"#);
    }
}
