use std::time::Instant;

use once_cell::sync::Lazy;

pub mod codec;
pub mod cost;
pub mod dock_config;
pub mod dock_optimizer;
pub mod dock_parse;
pub mod error;
pub mod geometry;
pub mod io;
pub mod local_search;
pub mod overlap;
pub mod render;
pub mod shape;
pub mod solution;

pub static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);
