//! Configuration transport: pulls `celex-map.json` and `patterns.json` from a
//! configuration host before the engine runs.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ConfigClient, FetchError};
