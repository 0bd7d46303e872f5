#![forbid(unsafe_code)]

use cc_storage::{DocumentKind, DocumentSource, FrameworkRepository, HttpSource, LoadError, LoadState};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{Sender, channel};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct Server {
    port: u16,
    release: Sender<()>,
    handle: JoinHandle<Vec<String>>,
}

impl Server {
    /// Closes the held connections and returns the raw request heads.
    fn finish(self) -> Vec<String> {
        let _ = self.release.send(());
        self.handle.join().expect("server")
    }
}

/// Serves one canned response per accepted connection. Connections stay open
/// until `finish`, so clients must stop at the declared body length.
fn serve(responses: Vec<String>) -> Option<Server> {
    let listener = match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => return None,
        Err(err) => panic!("bind loopback: {err}"),
    };
    let port = listener.local_addr().expect("local addr").port();
    let (release, released) = channel::<()>();
    let handle = std::thread::spawn(move || {
        let mut seen = Vec::new();
        let mut held: Vec<TcpStream> = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).expect("read request");
            seen.push(String::from_utf8_lossy(&buf[..n]).to_string());
            stream.write_all(response.as_bytes()).expect("write response");
            held.push(stream);
        }
        let _ = released.recv_timeout(Duration::from_secs(10));
        seen
    });
    Some(Server {
        port,
        release,
        handle,
    })
}

fn ok(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

#[test]
fn http_source_fetches_documents_under_base_path() {
    let Some(server) = serve(vec![ok(r#"{"meta":{"name":"Remote"}}"#)]) else {
        return;
    };
    let port = server.port;
    let source = HttpSource::parse_url(&format!("http://127.0.0.1:{port}/static")).expect("url");
    let mut repo = FrameworkRepository::new(source);

    let started = Instant::now();
    let framework = repo.framework().expect("framework loads");
    assert_eq!(framework.meta.name, "Remote");
    // The server still holds the connection; only Content-Length ends the body.
    assert!(started.elapsed() < Duration::from_secs(3));

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /static/data/framework.json HTTP/1.1\r\n"));
    let host = requests[0]
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case("host").then(|| value.trim().to_string())
        })
        .expect("host header");
    assert_eq!(host, format!("127.0.0.1:{port}"));
}

#[test]
fn non_2xx_lens_response_fails_and_is_retried() {
    let not_found = "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\n\r\nnot found".to_string();
    let Some(server) = serve(vec![not_found, ok(r#"{"meta":{"name":"Lens"}}"#)]) else {
        return;
    };
    let source = HttpSource::new("127.0.0.1", server.port, "");
    let mut repo = FrameworkRepository::new(source);

    let err = repo.lens().expect_err("404 must fail");
    assert!(matches!(
        err,
        LoadError::Status {
            document: DocumentKind::Lens,
            status: 404
        }
    ));
    assert!(matches!(repo.state(DocumentKind::Lens), LoadState::Failed(_)));

    let lens = repo.lens().expect("second attempt succeeds");
    assert_eq!(lens.meta.name, "Lens");
    assert_eq!(repo.state(DocumentKind::Lens), LoadState::Ready);
    assert_eq!(server.finish().len(), 2);
}

#[test]
fn refused_connection_is_a_transport_error() {
    let listener = match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => listener,
        Err(_) => return,
    };
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let source = HttpSource::new("127.0.0.1", port, "/");
    assert!(matches!(
        source.fetch(DocumentKind::Framework),
        Err(LoadError::Transport {
            document: DocumentKind::Framework,
            ..
        })
    ));
}
