//! Replay script format.

use serde::Deserialize;
use std::path::PathBuf;
use thoughtmesh_core::{EngineConfig, EngineError, PointerEvent};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Step {step} refers to node #{index}, but only {count} were created")]
    NodeIndex {
        step: usize,
        index: usize,
        count: usize,
    },
}

/// A timed sequence of inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Overrides merged into the default engine config.
    #[serde(default)]
    pub config: Option<EngineConfig>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Milliseconds since the start of the replay.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Pointer(PointerEvent),
    Tick {
        #[serde(default = "one")]
        frames: u32,
        #[serde(default = "frame_ms")]
        interval_ms: u64,
    },
    CreateNode {
        x: f64,
        y: f64,
    },
    SetText {
        node_index: usize,
        text: String,
    },
    DestroyNode {
        node_index: usize,
    },
}

fn one() -> u32 {
    1
}

fn frame_ms() -> u64 {
    16
}

impl Script {
    pub fn parse(json: &str) -> Result<Self, ReplayError> {
        let script: Script = serde_json::from_str(json)?;
        if let Some(config) = &script.config {
            config.validate()?;
        }
        Ok(script)
    }
}
