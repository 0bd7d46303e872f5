#![forbid(unsafe_code)]

pub mod compare;
pub mod graph;
pub mod lens;
pub mod level;
pub mod model;
pub mod query;
pub mod refs;

pub use level::{Level, LevelParseError, infer_actor_level};
pub use model::{
    Actor, Entity, EntityKind, Framework, FrameworkMeta, PracticeExample, Site,
    actor_label_from_id, fields,
};
