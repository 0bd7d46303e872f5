#![forbid(unsafe_code)]

mod api;
mod assets;
mod render;

pub(crate) use api::{ApiError, ApiResponse, ViewerState, route};

use crate::config::{DataLocation, ViewerConfig};
use cc_storage::{DirSource, DocumentSource, FrameworkRepository, LensPreferences, SqliteStore};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

const MAX_BODY_BYTES: usize = 16 * 1024;

pub(crate) fn serve(config: ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(("127.0.0.1", config.port))?;
    let store = SqliteStore::open(&config.storage_dir)?;

    let source: Box<dyn DocumentSource> = match &config.data {
        DataLocation::Dir(dir) => Box::new(DirSource::new(dir)),
        DataLocation::Http(source) => Box::new(source.clone()),
    };
    let mut state = ViewerState::new(FrameworkRepository::new(source), LensPreferences::load(store));

    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        data = %config.data_label(),
        storage_dir = %config.storage_dir.display(),
        fingerprint = %crate::build_fingerprint(),
        "viewer listening"
    );
    run_viewer(listener, &mut state);
    Ok(())
}

/// One request at a time; the state is owned by this loop.
fn run_viewer<S: DocumentSource>(listener: TcpListener, state: &mut ViewerState<S>) {
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(err) = handle_connection(stream, state) {
                    tracing::debug!(error = %err, "connection dropped");
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "accept failed");
                std::thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

fn handle_connection<S: DocumentSource>(
    mut stream: TcpStream,
    state: &mut ViewerState<S>,
) -> std::io::Result<()> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream)? else {
        return Ok(());
    };

    let method = request.method.as_str();
    let head_only = method == "HEAD";
    if !matches!(method, "GET" | "HEAD" | "POST") {
        tracing::debug!(method, path = %request.path, status = 405, "request");
        return write_api_error(&mut stream, &ApiError::method_not_allowed(), false);
    }

    let path = normalize_path(&request.path);
    let asset = match path.as_str() {
        "/" | "/index.html" => Some(("text/html; charset=utf-8", assets::INDEX_HTML)),
        "/app.css" => Some(("text/css; charset=utf-8", assets::APP_CSS)),
        "/app.js" => Some(("application/javascript; charset=utf-8", assets::APP_JS)),
        _ => None,
    };
    if let Some((content_type, body)) = asset {
        tracing::debug!(method, %path, status = 200, "request");
        return write_response(&mut stream, "200 OK", content_type, body.as_bytes(), head_only);
    }

    match route(state, method, &request.path, &request.body) {
        Ok(response) => {
            tracing::debug!(method, %path, status = 200, "request");
            let (content_type, body) = match response {
                ApiResponse::Json(value) => ("application/json; charset=utf-8", value.to_string()),
                ApiResponse::Markdown(text) => ("text/markdown; charset=utf-8", text),
            };
            write_response(&mut stream, "200 OK", content_type, body.as_bytes(), head_only)
        }
        Err(err) => {
            tracing::debug!(method, %path, status = err.status, code = err.code, "request");
            write_api_error(&mut stream, &err, head_only)
        }
    }
}

struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<HttpRequest>> {
    let mut buf = [0u8; 4096];
    let mut data = Vec::<u8>::new();
    while !data.windows(4).any(|w| w == b"\r\n\r\n") && data.len() <= 8192 {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => data.extend_from_slice(&buf[..read]),
            Err(err) if is_timeout(&err) => break,
            Err(err) => return Err(err),
        }
    }
    if data.is_empty() {
        return Ok(None);
    }

    let header_end = data
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
        .unwrap_or(data.len());
    let header_text = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut body = data[header_end..].to_vec();

    let mut lines = header_text.split("\r\n");
    let Some(request_line) = lines.next() else {
        return Ok(None);
    };
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("/").to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0)
        .min(MAX_BODY_BYTES);

    while body.len() < content_length {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => body.extend_from_slice(&buf[..read]),
            Err(err) if is_timeout(&err) => break,
            Err(err) => return Err(err),
        }
    }
    body.truncate(content_length);

    Ok(Some(HttpRequest { method, path, body }))
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

pub(crate) fn normalize_path(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw.split('?').next().unwrap_or(raw).trim();
    if raw.is_empty() || raw.len() > 256 || raw.contains("..") || raw.contains('\\') {
        return "/".to_string();
    }
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Decoded value of `key` in the request target's query string; empty values read as absent.
pub(crate) fn query_param(raw: &str, key: &str) -> Option<String> {
    let query = raw.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (name.trim() == key).then_some(value)
        })
        .next()
        .and_then(decode_query_value)
}

fn decode_query_value(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.len() > 512 {
        return None;
    }

    let hex = |b: u8| match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    };
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0usize;
    while idx < bytes.len() {
        match bytes[idx] {
            b'+' => {
                out.push(b' ');
                idx += 1;
            }
            b'%' if idx + 2 < bytes.len() => {
                out.push((hex(bytes[idx + 1])? << 4) | hex(bytes[idx + 2])?);
                idx += 3;
            }
            byte => {
                out.push(byte);
                idx += 1;
            }
        }
    }
    let decoded = String::from_utf8(out).ok()?;
    let decoded = decoded.trim();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.to_string())
    }
}

fn write_api_error(stream: &mut TcpStream, err: &ApiError, head_only: bool) -> std::io::Result<()> {
    let body = err.to_json().to_string();
    write_response(
        stream,
        err.status_line(),
        "application/json; charset=utf-8",
        body.as_bytes(),
        head_only,
    )
}

fn write_response(
    stream: &mut TcpStream,
    status: &str,
    content_type: &str,
    body: &[u8],
    head_only: bool,
) -> std::io::Result<()> {
    let headers = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: {content_type}\r\n\
         Cache-Control: no-store\r\n\
         X-Content-Type-Options: nosniff\r\n\
         Content-Security-Policy: default-src 'self'; style-src 'self'; script-src 'self'; img-src 'self' data:;\r\n\
         Connection: close\r\n\
         Content-Length: {}\r\n\r\n",
        body.len()
    );
    stream.write_all(headers.as_bytes())?;
    if !head_only {
        stream.write_all(body)?;
    }
    stream.flush()
}
