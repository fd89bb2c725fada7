//! In-process HTTP endpoints for tests
//!
//! A plain HTTP proxy receives `GET http://target/... HTTP/1.1` and answers
//! for the target, so the same canned server stands in for both list
//! providers and proxies under test.

use crate::proxy::models::Candidate;
use crate::proxy::provider::Provider;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub content_length: usize,
    pub body_len: usize,
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    /// Connection held open this long after the body, before closing
    pub stall: Duration,
}

impl FakeResponse {
    /// A response that sends its whole declared body at full speed
    pub fn sized(len: usize) -> Self {
        Self {
            content_length: len,
            body_len: len,
            chunk_size: 8 * 1024,
            chunk_delay: Duration::ZERO,
            stall: Duration::ZERO,
        }
    }

    pub fn declaring(mut self, content_length: usize) -> Self {
        self.content_length = content_length;
        self.body_len = self.body_len.min(content_length);
        self
    }

    /// Declare `len` bytes, send only `sent` of them, then go quiet for `stall`
    pub fn stalling(len: usize, sent: usize, stall: Duration) -> Self {
        Self {
            body_len: sent.min(len),
            stall,
            ..Self::sized(len)
        }
    }

    pub fn throttled(mut self, chunk_size: usize, chunk_delay: Duration) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_delay = chunk_delay;
        self
    }
}

/// Serve a generated body to every connection
pub async fn serve(response: FakeResponse) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                let _ = write_generated(&mut socket, &response).await;
            });
        }
    });

    addr
}

/// Serve a fixed text body to every connection
pub async fn serve_text(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                if read_request_head(&mut socket).await.is_ok() {
                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(body.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });
        }
    });

    addr
}

/// An address where nothing is listening
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn write_generated(socket: &mut TcpStream, response: &FakeResponse) -> std::io::Result<()> {
    read_request_head(socket).await?;

    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.content_length
    );
    socket.write_all(head.as_bytes()).await?;

    let chunk = vec![b'x'; response.chunk_size];
    let mut sent = 0;
    while sent < response.body_len {
        let n = chunk.len().min(response.body_len - sent);
        socket.write_all(&chunk[..n]).await?;
        socket.flush().await?;
        sent += n;
        if !response.chunk_delay.is_zero() {
            tokio::time::sleep(response.chunk_delay).await;
        }
    }
    if !response.stall.is_zero() {
        tokio::time::sleep(response.stall).await;
    }
    socket.shutdown().await
}

async fn read_request_head(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut byte).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&byte[..n]);
    }
    Ok(())
}

/// A provider returning a fixed candidate list and counting its calls
pub struct StaticProvider {
    candidates: Vec<Candidate>,
    calls: Arc<AtomicUsize>,
}

impl StaticProvider {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_candidates(&self) -> anyhow::Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

/// A provider whose upstream is always down
pub struct BrokenProvider;

#[async_trait]
impl Provider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    async fn fetch_candidates(&self) -> anyhow::Result<Vec<Candidate>> {
        anyhow::bail!("upstream returned garbage")
    }
}
