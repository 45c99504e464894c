//! TOML chunk files: cell values plus named target formulas.
//!
//! ```toml
//! [cells.Dashboard]
//! "Battery energy" = 42.0
//!
//! [[targets]]
//! name = "energy per module"
//! chunks = [["Dashboard", "Battery energy", " / "], ["", 4]]
//! ```

use std::path::Path;

use batpy_core::{CellTable, Chunk};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkFile {
    #[serde(default)]
    pub cells: CellTable,
    #[serde(default)]
    pub targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub name: String,
    pub chunks: Vec<Chunk>,
}

impl ChunkFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).wrap_err_with(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: ChunkFile = toml::from_str(content).into_diagnostic()?;
        tracing::debug!(targets = file.targets.len(), "loaded chunk file");
        Ok(file)
    }
}
