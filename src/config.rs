use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default CSV published by the Comune di Piacenza open-data portal.
pub const DEFAULT_DATASET: &str = "comune-di-piacenza-nomi-iscritti-per-nascita.csv";

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Runtime configuration shared by the service and the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the source CSV.
    pub dataset_path: PathBuf,
    /// Address the query service listens on.
    pub bind: SocketAddr,
}

impl Config {
    /// Build from `NOMI_DATASET` / `NOMI_BIND`, falling back to defaults.
    /// A first positional argument, if any, overrides the dataset path.
    pub fn from_env() -> Result<Self> {
        Self::from_parts(
            env::var("NOMI_DATASET").ok(),
            env::var("NOMI_BIND").ok(),
            env::args().nth(1),
        )
    }

    fn from_parts(
        dataset: Option<String>,
        bind: Option<String>,
        arg: Option<String>,
    ) -> Result<Self> {
        let dataset_path = arg
            .or(dataset)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_DATASET.to_string())
            .into();

        let bind = bind.unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("NOMI_BIND '{bind}' is not a socket address"))?;

        Ok(Config { dataset_path, bind })
    }
}
