//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use forum_client::config::ClientConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as the mock backend saw it.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    /// Header lines with lowercased names.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[allow(dead_code)]
impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Requests recorded by a mock backend, in arrival order.
pub type Seen = Arc<Mutex<Vec<SeenRequest>>>;

/// Start a programmable mock backend on an ephemeral port.
///
/// The handler picks the status and body for every request.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Seen)
where
    F: Fn(SeenRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);
    let seen: Seen = Arc::default();
    let log = seen.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        log.lock().unwrap().push(request.clone());

                        let (status, body) = f(request).await;
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

/// Start a mock backend that always answers with `status` and `body`.
#[allow(dead_code)]
pub async fn start_mock_backend(status: u16, body: &'static str) -> (SocketAddr, Seen) {
    start_programmable_backend(move |_| async move { (status, body.to_string()) }).await
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Default config pointed at `addr`.
#[allow(dead_code)]
pub fn config_for(addr: SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.api.base_url = format!("http://{addr}");
    config.api.request_timeout_secs = 5;
    config.api.connect_timeout_secs = 2;
    config
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        201 => "201 Created",
        400 => "400 Bad Request",
        401 => "401 Unauthorized",
        404 => "404 Not Found",
        422 => "422 Unprocessable Entity",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();

    Some(SeenRequest {
        method,
        path,
        headers,
        body,
    })
}
