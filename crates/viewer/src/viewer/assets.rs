#![forbid(unsafe_code)]

pub(crate) const INDEX_HTML: &str = include_str!("assets/index.html");
pub(crate) const APP_CSS: &str = include_str!("assets/app.css");
pub(crate) const APP_JS: &str = include_str!("assets/app.js");
