//! Query engine, dataset store and HTTP service for the Comune di Piacenza
//! birth-registered names dataset.
//!
//! The `nomi-piacenza` viewer and the `nomi-server` binary both go through
//! [`data::store::DatasetStore`] and [`data::query`].

pub mod config;
pub mod data;
pub mod error;
pub mod server;

pub use error::{Error, Result};
