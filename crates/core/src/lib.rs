#![forbid(unsafe_code)]

pub mod model;
pub mod query;
pub mod stats;
