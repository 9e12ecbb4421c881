//! Offline replay of a recorded trace.

use std::path::PathBuf;

use jiff::Timestamp;
use serde::Serialize;
use uuid::Uuid;

use fairway::cadence::Cadence;
use fairway::config::Config;
use fairway::engine::{EngineKind, Progression, Sample};
use fairway::follow::MachineOptions;
use fairway::model::HoleTransition;
use fairway::snapshot::HoleSnapshot;
use fairway::storage::SqliteStore;
use fairway::telemetry::{TickReport, TracingSink, TransitionSink};
use fairway::trace::{self, TraceSample};

use super::format::{format_engine, format_hole, format_snapshot, format_transition};

pub(super) struct ReplayArgs {
    pub course: PathBuf,
    pub trace: PathBuf,
    pub round: Option<String>,
    pub engine: EngineKind,
    pub auto_advance: bool,
    pub json: bool,
}

/// End-of-replay totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    round_id: String,
    engine: EngineKind,
    fixes: usize,
    processed: usize,
    transitions: usize,
    auto_advances: usize,
    hole_id: Option<String>,
    snapshot: Option<HoleSnapshot>,
}

pub(super) fn cmd_replay(config: &Config, args: &ReplayArgs) -> Result<(), String> {
    let holes = trace::load_course(&args.course)
        .map_err(|e| format!("failed to load course {}: {e}", args.course.display()))?;
    let samples = trace::load_trace(&args.trace)
        .map_err(|e| format!("failed to load trace {}: {e}", args.trace.display()))?;

    // Only a named round is worth keeping.
    let store = match &args.round {
        Some(_) => {
            let path = config
                .database_path()
                .ok_or("could not determine home directory")?;
            SqliteStore::open(&path).map_err(|e| format!("failed to open {}: {e}", path.display()))?
        }
        None => SqliteStore::open_in_memory()
            .map_err(|e| format!("failed to open in-memory store: {e}"))?,
    };
    let round_id = args
        .round
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut options = MachineOptions::new(round_id.clone(), holes);
    options.auto_advance_enabled = args.auto_advance;
    options.locate_tolerance_m = config.locate_tolerance_m;
    let mut progression = Progression::start(args.engine, options, config.auto, &store);

    let mut cadence = Cadence::new();
    let mut processed = 0;
    let mut transitions: Vec<HoleTransition> = Vec::new();
    let mut auto_advances = 0;
    let mut last: Option<&TraceSample> = None;

    for sample in &samples {
        let Some(freq_hz) = cadence.admit(sample.heading_deg, Some(sample.speed_mps), sample.ts)
        else {
            continue;
        };
        processed += 1;
        last = Some(sample);

        let mut sink = |t: &HoleTransition| {
            TracingSink.record(t);
            transitions.push(t.clone());
        };
        let started = Timestamp::now();
        let progress = progression.step(
            &Sample {
                position: Some(sample.position),
                heading_deg: sample.heading_deg,
                speed_mps: Some(sample.speed_mps),
                now: sample.ts,
            },
            &mut sink,
        );
        // Trace fixes are historical: latency is the time spent processing.
        let latency_ms = Timestamp::now().as_millisecond() - started.as_millisecond();
        TickReport::with_latency(
            latency_ms,
            sample.ts,
            freq_hz,
            progress.auto_advanced,
            progression.override_ts(),
        )
        .emit();

        if progress.auto_advanced {
            auto_advances += 1;
        }
        if let Some(t) = &progress.transition {
            print_transition(t, args.json)?;
        }
    }

    let snapshot =
        last.and_then(|s| progression.snapshot(&s.position, s.heading_deg, s.ts));
    let summary = Summary {
        round_id,
        engine: progression.kind(),
        fixes: samples.len(),
        processed,
        transitions: transitions.len(),
        auto_advances,
        hole_id: progression.hole().map(|h| h.id.clone()),
        snapshot,
    };

    if args.json {
        let line = serde_json::to_string(&summary)
            .map_err(|e| format!("failed to serialize summary: {e}"))?;
        println!("{line}");
        return Ok(());
    }

    println!();
    println!(
        "round {} ({}): {} of {} fixes processed, {} hole changes ({} automatic)",
        summary.round_id,
        format_engine(summary.engine),
        summary.processed,
        summary.fixes,
        summary.transitions,
        summary.auto_advances,
    );
    match progression.hole() {
        Some(hole) => println!("final: {}", format_hole(hole)),
        None => println!("final: no hole located"),
    }
    if let Some(snapshot) = &summary.snapshot {
        println!("       {}", format_snapshot(snapshot));
    }
    Ok(())
}

fn print_transition(t: &HoleTransition, json: bool) -> Result<(), String> {
    if json {
        let line =
            serde_json::to_string(t).map_err(|e| format!("failed to serialize transition: {e}"))?;
        println!("{line}");
    } else {
        println!("{}", format_transition(t));
    }
    Ok(())
}
