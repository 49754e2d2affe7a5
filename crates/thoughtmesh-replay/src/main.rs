//! Headless replay driver.
//!
//! Feeds a timed pointer script through a [`Canvas`] and prints every
//! published event as one JSON line, followed by the final shape list.

mod script;

use clap::Parser;
use script::{Action, ReplayError, Script};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use thoughtmesh_core::{Canvas, EngineConfig, EngineEvent, NodeId, Shape, Vector2};

/// Replay a pointer script through the thoughtmesh engine
#[derive(Parser, Debug)]
#[command(name = "thoughtmesh-replay")]
#[command(about = "Replay pointer scripts through the thoughtmesh engine")]
struct Args {
    /// Script to replay
    script: PathBuf,

    /// Engine config JSON; overrides the script's own config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only print events, not the final shapes
    #[arg(long)]
    events_only: bool,
}

#[derive(Serialize)]
struct EventLine<'a> {
    at_ms: u64,
    event: &'a EngineEvent,
}

#[derive(Serialize)]
struct Summary<'a> {
    nodes: usize,
    lines: usize,
    shapes: Vec<&'a Shape>,
}

fn read(path: &Path) -> Result<String, ReplayError> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn node_at(created: &[NodeId], step: usize, index: usize) -> Result<NodeId, ReplayError> {
    created.get(index).copied().ok_or(ReplayError::NodeIndex {
        step,
        index,
        count: created.len(),
    })
}

fn emit(out: &mut impl Write, at_ms: u64, canvas: &mut Canvas) -> Result<(), ReplayError> {
    for event in canvas.drain_events() {
        serde_json::to_writer(&mut *out, &EventLine { at_ms, event: &event })?;
        writeln!(out).map_err(|source| ReplayError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })?;
    }
    Ok(())
}

fn replay(args: &Args) -> Result<(), ReplayError> {
    let script = Script::parse(&read(&args.script)?)?;
    let config = match &args.config {
        Some(path) => EngineConfig::from_json(&read(path)?)?,
        None => script.config.clone().unwrap_or_default(),
    };
    let mut canvas = Canvas::new(config)?;
    log::info!(
        "Replaying {} steps from {}",
        script.steps.len(),
        args.script.display()
    );

    let start = Instant::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    // Nodes the script created itself, addressable by index.
    let mut created: Vec<NodeId> = Vec::new();

    for (index, step) in script.steps.iter().enumerate() {
        let now = start + Duration::from_millis(step.at_ms);
        match &step.action {
            Action::Pointer(event) => canvas.handle_pointer(event, now),
            Action::Tick {
                frames,
                interval_ms,
            } => {
                for frame in 0..*frames {
                    let at = now + Duration::from_millis(u64::from(frame) * interval_ms);
                    canvas.tick(at);
                }
            }
            Action::CreateNode { x, y } => {
                let id = canvas.create_node(Vector2::new(*x, *y), None)?;
                created.push(id);
            }
            Action::SetText { node_index, text } => {
                let id = node_at(&created, index, *node_index)?;
                canvas.set_node_text(id, text)?;
            }
            Action::DestroyNode { node_index } => {
                let id = node_at(&created, index, *node_index)?;
                if !canvas.destroy_node(id) {
                    log::warn!("Step {index}: node #{node_index} was already gone");
                }
            }
        }
        emit(&mut out, step.at_ms, &mut canvas)?;
    }

    if !args.events_only {
        let summary = Summary {
            nodes: canvas.graph().node_count(),
            lines: canvas.graph().line_count(),
            shapes: canvas.shapes().collect(),
        };
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out).map_err(|source| ReplayError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })?;
    }
    log::info!(
        "Replay finished: {} nodes, {} effects still running",
        canvas.graph().node_count(),
        canvas.active_effects()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::info!("Starting thoughtmesh replay");

    match replay(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Replay failed: {err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
