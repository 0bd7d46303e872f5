#![forbid(unsafe_code)]

mod error;
mod lenient;
pub mod lens_doc;
pub mod normalize;
pub mod preferences;
pub mod repository;
pub mod source;
mod store;
pub mod transform;

pub use error::{LoadError, StoreError};
pub use lens_doc::{EntityAnnotation, LensDocument, PosthumanActor, PosthumanCategory};
pub use normalize::{parse_framework, parse_framework_bytes};
pub use preferences::{LENS_STORAGE_KEY, LensPreferences};
pub use repository::{FrameworkRepository, LoadState};
pub use source::{DirSource, DocumentKind, DocumentSource, HttpSource, MemorySource};
pub use store::SqliteStore;
pub use transform::{TextTransform, TransformRule};
