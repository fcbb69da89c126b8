//! Minimal HTTP/1.1 server that answers `GET /codes/` for integration tests.
//!
//! Each request gets the next canned response from a closure; the request
//! counter lets tests assert how often the client polled.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// A canned response: status line (e.g. "200 OK") and body.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: &'static str,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: "200 OK",
            body: body.into(),
        }
    }

    pub fn status(status: &'static str) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

pub struct CodesServer {
    /// Origin, e.g. "http://127.0.0.1:12345".
    pub origin: String,
    requests: Arc<AtomicUsize>,
}

impl CodesServer {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. `reply` receives the 0-based index
/// of each `/codes/` request. Other paths get 404. Runs until the process exits.
pub fn start<F>(reply: F) -> CodesServer
where
    F: Fn(usize) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    let reply = Arc::new(reply);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let reply = Arc::clone(&reply);
            let counter = Arc::clone(&counter);
            thread::spawn(move || handle(stream, &*reply, &counter));
        }
    });
    CodesServer {
        origin: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// Server that always answers with the same body.
pub fn serving(body: &str) -> CodesServer {
    let body = body.to_string();
    start(move |_| Reply::ok(body.clone()))
}

fn handle<F>(mut stream: std::net::TcpStream, reply: &F, counter: &AtomicUsize)
where
    F: Fn(usize) -> Reply,
{
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");

    let r = if method.eq_ignore_ascii_case("GET") && path == "/codes/" {
        let index = counter.fetch_add(1, Ordering::SeqCst);
        reply(index)
    } else {
        Reply::status("404 Not Found")
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        r.status,
        r.body.len(),
        r.body
    );
    let _ = stream.write_all(response.as_bytes());
}
