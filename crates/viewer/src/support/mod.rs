#![forbid(unsafe_code)]

mod build_info;
mod time;

pub(crate) use build_info::*;
pub(crate) use time::*;
