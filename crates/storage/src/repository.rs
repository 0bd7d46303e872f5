#![forbid(unsafe_code)]

use crate::error::LoadError;
use crate::lens_doc::{LensDocument, parse_lens_bytes};
use crate::normalize::parse_framework_bytes;
use crate::source::{DocumentKind, DocumentSource};
use cc_core::Framework;
use sha2::Digest as _;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
struct Loaded<T> {
    value: Arc<T>,
    fingerprint: String,
}

#[derive(Debug)]
struct Slot<T> {
    loaded: Option<Loaded<T>>,
    last_error: Option<String>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            loaded: None,
            last_error: None,
        }
    }
}

impl<T> Slot<T> {
    fn state(&self) -> LoadState {
        match (&self.loaded, &self.last_error) {
            (Some(_), _) => LoadState::Ready,
            (None, Some(message)) => LoadState::Failed(message.clone()),
            (None, None) => LoadState::Pending,
        }
    }

    fn get_or_load<S>(
        &mut self,
        source: &S,
        kind: DocumentKind,
        parse: fn(&[u8]) -> Result<T, LoadError>,
    ) -> Result<Arc<T>, LoadError>
    where
        S: DocumentSource + ?Sized,
    {
        if let Some(loaded) = &self.loaded {
            tracing::debug!(document = %kind, "document cache hit");
            return Ok(Arc::clone(&loaded.value));
        }

        let result = source.fetch(kind).and_then(|bytes| {
            let fingerprint = sha256_hex(&bytes);
            parse(&bytes).map(|value| (value, fingerprint))
        });
        match result {
            Ok((value, fingerprint)) => {
                tracing::info!(
                    document = %kind,
                    source = %source.describe(),
                    fingerprint = %fingerprint,
                    "document loaded"
                );
                let value = Arc::new(value);
                self.loaded = Some(Loaded {
                    value: Arc::clone(&value),
                    fingerprint,
                });
                self.last_error = None;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(document = %kind, source = %source.describe(), error = %err, "document load failed");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

/// Loads both documents on first use and keeps them for the repository's lifetime.
///
/// Failures are not cached: the next call fetches again.
#[derive(Debug)]
pub struct FrameworkRepository<S> {
    source: S,
    framework: Slot<Framework>,
    lens: Slot<LensDocument>,
}

impl<S: DocumentSource> FrameworkRepository<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            framework: Slot::default(),
            lens: Slot::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn framework(&mut self) -> Result<Arc<Framework>, LoadError> {
        self.framework.get_or_load(
            &self.source,
            DocumentKind::Framework,
            parse_framework_bytes,
        )
    }

    pub fn lens(&mut self) -> Result<Arc<LensDocument>, LoadError> {
        self.lens
            .get_or_load(&self.source, DocumentKind::Lens, parse_lens_bytes)
    }

    pub fn state(&self, kind: DocumentKind) -> LoadState {
        match kind {
            DocumentKind::Framework => self.framework.state(),
            DocumentKind::Lens => self.lens.state(),
        }
    }

    /// Hex SHA-256 of the cached document bytes.
    pub fn fingerprint(&self, kind: DocumentKind) -> Option<&str> {
        let loaded = match kind {
            DocumentKind::Framework => self.framework.loaded.as_ref().map(|l| &l.fingerprint),
            DocumentKind::Lens => self.lens.loaded.as_ref().map(|l| &l.fingerprint),
        };
        loaded.map(String::as_str)
    }

    pub fn invalidate(&mut self) {
        tracing::info!(source = %self.source.describe(), "document caches cleared");
        self.framework = Slot::default();
        self.lens = Slot::default();
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for b in digest {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use std::cell::Cell;

    struct CountingSource {
        inner: MemorySource,
        fetches: Cell<usize>,
    }

    impl DocumentSource for CountingSource {
        fn fetch(&self, kind: DocumentKind) -> Result<Vec<u8>, LoadError> {
            self.fetches.set(self.fetches.get() + 1);
            self.inner.fetch(kind)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn counting(inner: MemorySource) -> FrameworkRepository<CountingSource> {
        FrameworkRepository::new(CountingSource {
            inner,
            fetches: Cell::new(0),
        })
    }

    #[test]
    fn successful_loads_are_memoized() {
        let mut repo = counting(
            MemorySource::new().with_document(DocumentKind::Framework, r#"{"meta":{"name":"X"}}"#),
        );
        assert_eq!(repo.state(DocumentKind::Framework), LoadState::Pending);
        let first = repo.framework().unwrap();
        let second = repo.framework().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.meta.name, "X");
        assert_eq!(repo.source().fetches.get(), 1);
        assert_eq!(repo.state(DocumentKind::Framework), LoadState::Ready);
        assert_eq!(repo.fingerprint(DocumentKind::Framework).map(str::len), Some(64));
    }

    #[test]
    fn failures_are_retried_on_next_call() {
        let mut repo =
            counting(MemorySource::new().with_status(DocumentKind::Lens, 500));
        assert!(matches!(repo.lens(), Err(LoadError::Status { status: 500, .. })));
        assert!(repo.lens().is_err());
        assert_eq!(repo.source().fetches.get(), 2);
        assert!(matches!(
            repo.state(DocumentKind::Lens),
            LoadState::Failed(message) if message.contains("500")
        ));
        assert_eq!(repo.fingerprint(DocumentKind::Lens), None);
    }

    #[test]
    fn invalidate_forces_a_fresh_fetch() {
        let mut repo = counting(
            MemorySource::new()
                .with_document(DocumentKind::Framework, "{}")
                .with_document(DocumentKind::Lens, "{}"),
        );
        repo.framework().unwrap();
        repo.lens().unwrap();
        repo.invalidate();
        assert_eq!(repo.state(DocumentKind::Lens), LoadState::Pending);
        repo.framework().unwrap();
        assert_eq!(repo.source().fetches.get(), 3);
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
