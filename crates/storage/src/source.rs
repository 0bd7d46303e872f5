#![forbid(unsafe_code)]

use crate::error::LoadError;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_DOCUMENT_BYTES: usize = 8 * 1024 * 1024;

/// The two static documents the application reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    Framework,
    Lens,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Framework, DocumentKind::Lens];

    /// Fixed path relative to the static asset root.
    pub fn relative_path(self) -> &'static str {
        match self {
            Self::Framework => "data/framework.json",
            Self::Lens => "data/posthuman_lens.json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Framework => "framework",
            Self::Lens => "lens",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.relative_path())
    }
}

/// Where raw document bytes come from.
pub trait DocumentSource {
    fn fetch(&self, kind: DocumentKind) -> Result<Vec<u8>, LoadError>;

    fn describe(&self) -> String;
}

/// Reads documents from a static asset directory on disk.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, kind: DocumentKind) -> PathBuf {
        self.root.join(kind.relative_path())
    }
}

impl DocumentSource for DirSource {
    fn fetch(&self, kind: DocumentKind) -> Result<Vec<u8>, LoadError> {
        std::fs::read(self.path_for(kind)).map_err(|source| LoadError::Fetch {
            document: kind,
            source,
        })
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}

/// Fetches documents with `GET` from a static file server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpSource {
    host: String,
    port: u16,
    base_path: String,
}

impl HttpSource {
    pub fn new(host: impl Into<String>, port: u16, base_path: &str) -> Self {
        let base_path = base_path.trim().trim_end_matches('/');
        let base_path = if base_path.is_empty() || base_path.starts_with('/') {
            base_path.to_string()
        } else {
            format!("/{base_path}")
        };
        Self {
            host: host.into(),
            port,
            base_path,
        }
    }

    /// Accepts `http://host[:port][/base]`; TLS is not supported.
    pub fn parse_url(url: &str) -> Option<Self> {
        let rest = url.trim().strip_prefix("http://")?;
        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return None;
        }
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().ok()?),
            None => (authority, 80),
        };
        if host.is_empty() {
            return None;
        }
        Some(Self::new(host, port, path))
    }

    fn request_path(&self, kind: DocumentKind) -> String {
        format!("{}/{}", self.base_path, kind.relative_path())
    }

    fn document_url(&self, kind: DocumentKind) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.request_path(kind))
    }
}

impl DocumentSource for HttpSource {
    fn fetch(&self, kind: DocumentKind) -> Result<Vec<u8>, LoadError> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(HTTP_TIMEOUT)
            .timeout_read(HTTP_TIMEOUT)
            .timeout_write(HTTP_TIMEOUT)
            .max_idle_connections(0)
            .build();
        let response = match agent
            .get(&self.document_url(kind))
            .set("Accept", "application/json")
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(LoadError::Status {
                    document: kind,
                    status,
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(LoadError::Transport {
                    document: kind,
                    source: Box::new(transport),
                });
            }
        };

        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_DOCUMENT_BYTES as u64 + 1)
            .read_to_end(&mut body)
            .map_err(|source| LoadError::Fetch {
                document: kind,
                source,
            })?;
        if body.len() > MAX_DOCUMENT_BYTES {
            return Err(LoadError::Protocol {
                document: kind,
                detail: "document too large",
            });
        }
        Ok(body)
    }

    fn describe(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.base_path)
    }
}

/// In-memory documents keyed by kind; a missing entry reads as HTTP 404.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    documents: HashMap<DocumentKind, Result<Vec<u8>, u16>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, kind: DocumentKind, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(kind, Ok(body.into()));
        self
    }

    pub fn with_status(mut self, kind: DocumentKind, status: u16) -> Self {
        self.documents.insert(kind, Err(status));
        self
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, kind: DocumentKind) -> Result<Vec<u8>, LoadError> {
        match self.documents.get(&kind) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(LoadError::Status {
                document: kind,
                status: *status,
            }),
            None => Err(LoadError::Status {
                document: kind,
                status: 404,
            }),
        }
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    fn fetch(&self, kind: DocumentKind) -> Result<Vec<u8>, LoadError> {
        (**self).fetch(kind)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
