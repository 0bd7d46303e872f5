#![forbid(unsafe_code)]

use crate::source::DocumentKind;

/// Why a document could not be turned into data.
///
/// Callers surface every variant the same way ("data unavailable") and keep the
/// variant for logs only.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{document}: fetch failed: {source}")]
    Fetch {
        document: DocumentKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{document}: request failed: {source}")]
    Transport {
        document: DocumentKind,
        #[source]
        source: Box<ureq::Transport>,
    },

    #[error("{document}: server answered HTTP {status}")]
    Status { document: DocumentKind, status: u16 },

    #[error("{document}: invalid response: {detail}")]
    Protocol {
        document: DocumentKind,
        detail: &'static str,
    },

    #[error("{document}: invalid JSON: {source}")]
    Parse {
        document: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{document}: top level must be a JSON object")]
    NotAnObject { document: DocumentKind },
}

impl LoadError {
    pub fn document(&self) -> DocumentKind {
        match self {
            Self::Fetch { document, .. }
            | Self::Transport { document, .. }
            | Self::Status { document, .. }
            | Self::Protocol { document, .. }
            | Self::Parse { document, .. }
            | Self::NotAnObject { document } => *document,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
