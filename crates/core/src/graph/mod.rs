#![forbid(unsafe_code)]

mod derive;
mod types;

pub use derive::*;
pub use types::*;

#[cfg(test)]
mod tests;
