//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body. HEAD answers with Content-Length,
//! Accept-Ranges and an ETag; GET with a Range answers 206 Partial Content.
//! Ranges reaching past the end of the body are rejected with 416 rather than
//! clamped, so a client asking for one byte too many is caught.
//! With `redirect_head`, HEAD on the served path answers 302 to
//! `REDIRECT_TARGET` with decoy size and ETag headers.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const TEST_ETAG: &str = "rangedl-test-etag";
pub const DECOY_ETAG: &str = "redirect-hop-etag";
pub const DECOY_CONTENT_LENGTH: u64 = 999_999;
pub const REDIRECT_TARGET: &str = "/moved/payload.bin";

#[derive(Debug, Clone, Default)]
pub struct RangeServerOptions {
    /// Status for HEAD; `None` = 200.
    pub head_status: Option<u16>,
    /// GETs whose range starts at one of these offsets get a 500.
    pub fail_offsets: Vec<u64>,
    /// If true, GET ignores Range and always returns 200 with the full body.
    pub ignore_ranges: bool,
    /// Pause before answering each GET, to make overlap observable.
    pub get_delay: Option<Duration>,
    /// If true, HEAD outside `REDIRECT_TARGET` answers 302 with decoy headers.
    pub redirect_head: bool,
}

/// Counters shared with the serving threads.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub heads: AtomicUsize,
    pub gets: AtomicUsize,
    pub active_gets: AtomicUsize,
    pub peak_gets: AtomicUsize,
}

impl ServerStats {
    pub fn peak(&self) -> usize {
        self.peak_gets.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

pub struct RangeServer {
    /// Base URL including a file name, e.g. "http://127.0.0.1:12345/payload.bin".
    pub url: String,
    pub stats: Arc<ServerStats>,
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    let stats = Arc::new(ServerStats::default());
    let server_stats = Arc::clone(&stats);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            let stats = Arc::clone(&server_stats);
            thread::spawn(move || handle(stream, &body, &opts, &stats));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/payload.bin", port),
        stats,
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: &RangeServerOptions, stats: &ServerStats) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let (method, path, range) = parse_request(&request);
    let total = body.len() as u64;

    if method.eq_ignore_ascii_case("HEAD") {
        stats.heads.fetch_add(1, Ordering::SeqCst);
        if opts.redirect_head && path != REDIRECT_TARGET {
            let response = format!(
                "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: {}\r\nETag: \"{}\"\r\nConnection: close\r\n\r\n",
                REDIRECT_TARGET, DECOY_CONTENT_LENGTH, DECOY_ETAG
            );
            let _ = stream.write_all(response.as_bytes());
            return;
        }
        let response = match opts.head_status {
            Some(code) if code != 200 => format!(
                "HTTP/1.1 {} Test Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                code
            ),
            _ => format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nETag: \"{}\"\r\nConnection: close\r\n\r\n",
                total, TEST_ETAG
            ),
        };
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        stats.gets.fetch_add(1, Ordering::SeqCst);
        let now = stats.active_gets.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak_gets.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = opts.get_delay {
            thread::sleep(delay);
        }
        respond_get(&mut stream, body, range, opts);
        stats.active_gets.fetch_sub(1, Ordering::SeqCst);
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
}

fn respond_get(stream: &mut TcpStream, body: &[u8], range: Option<(u64, u64)>, opts: &RangeServerOptions) {
    let total = body.len() as u64;
    let (status, content_range, slice) = match range {
        Some((start, _)) if opts.fail_offsets.contains(&start) => {
            ("500 Internal Server Error", None, &body[0..0])
        }
        Some((start, end_incl)) if !opts.ignore_ranges => {
            if start > end_incl || end_incl >= total {
                ("416 Range Not Satisfiable", Some(format!("bytes */{}", total)), &body[0..0])
            } else {
                (
                    "206 Partial Content",
                    Some(format!("bytes {}-{}/{}", start, end_incl, total)),
                    &body[start as usize..=end_incl as usize],
                )
            }
        }
        _ => ("200 OK", None, body),
    };

    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n",
        status,
        slice.len()
    );
    if let Some(cr) = content_range {
        response.push_str(&format!("Content-Range: {}\r\n", cr));
    }
    response.push_str("\r\n");
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

/// Reads until the end of the request headers.
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

/// Returns (method, path, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, &str, Option<(u64, u64)>) {
    let mut method = "";
    let mut path = "";
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            let mut words = line.split_whitespace();
            method = words.next().unwrap_or("");
            path = words.next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if value.to_lowercase().starts_with("bytes=") {
                    let part = value[6..].trim();
                    if let Some((a, b)) = part.split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end = b.trim();
                        let end_incl = if end.is_empty() {
                            u64::MAX
                        } else {
                            end.parse::<u64>().unwrap_or(0)
                        };
                        range = Some((start, end_incl));
                    }
                }
            }
        }
    }
    (method, path, range)
}
