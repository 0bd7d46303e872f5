#![forbid(unsafe_code)]

mod config;
mod support;
mod viewer;

pub(crate) use support::*;

use config::ViewerConfig;
use tracing_subscriber::EnvFilter;

const VIEWER_VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "cc_viewer=info,cc_storage=info";

fn usage() -> &'static str {
    "cc_viewer - Curriculum City reference viewer (local HTTP, read-only data)\n\n\
USAGE:\n\
  cc_viewer [--data-dir DIR | --data-url URL] [--storage-dir DIR] [--port PORT]\n\
            [--config FILE]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version/build and exit\n\
\n\
ENVIRONMENT:\n\
  CURRICULUM_CITY_CONFIG, CURRICULUM_CITY_DATA_DIR, CURRICULUM_CITY_DATA_URL,\n\
  CURRICULUM_CITY_STORAGE_DIR, CURRICULUM_CITY_PORT, RUST_LOG\n\
\n\
NOTES:\n\
  - Precedence: flags > environment > config file > defaults\n\
  - Defaults: --data-dir public --storage-dir .curriculum_city --port 7340\n\
  - Documents are read from <data>/data/framework.json and <data>/data/posthuman_lens.json\n"
}

fn version_line() -> String {
    format!("cc_viewer {VIEWER_VERSION} build={}", crate::build_fingerprint())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    init_logging();
    let config = ViewerConfig::resolve(&args, &|key| std::env::var(key).ok()).inspect_err(
        |err| tracing::error!(error = %err, "invalid configuration"),
    )?;
    viewer::serve(config)
}
