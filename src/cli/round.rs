//! Round commands: create round IDs, inspect and move the saved hole.

use std::path::Path;

use jiff::Timestamp;
use uuid::Uuid;

use fairway::config::Config;
use fairway::engine::Progression;
use fairway::follow::MachineOptions;
use fairway::model::HoleRef;
use fairway::storage::{SqliteStore, round};
use fairway::telemetry::TracingSink;
use fairway::trace;

use super::format::{format_hole, format_transition};

#[derive(Debug, Clone, Copy)]
pub(super) enum Direction {
    Next,
    Prev,
}

pub(super) fn cmd_new() {
    println!("{}", Uuid::new_v4());
}

pub(super) fn cmd_show(config: &Config, round_id: &str, course: &Path) -> Result<(), String> {
    let holes = load_course(course)?;
    let store = open_store(config)?;

    let Some(hole_id) = round::load_hole_id(&store, round_id) else {
        println!("No hole saved for round {round_id}");
        return Ok(());
    };

    match holes.iter().find(|h| h.id == hole_id) {
        Some(hole) => println!("{}", format_hole(hole)),
        None => println!("{hole_id} (not in this course)"),
    }
    Ok(())
}

pub(super) fn cmd_step(
    config: &Config,
    round_id: &str,
    course: &Path,
    direction: Direction,
) -> Result<(), String> {
    let holes = load_course(course)?;
    let store = open_store(config)?;

    let mut options = MachineOptions::new(round_id, holes);
    options.auto_advance_enabled = config.auto_advance;
    options.locate_tolerance_m = config.locate_tolerance_m;
    let mut progression = Progression::start(config.engine, options, config.auto, &store);

    let now = Timestamp::now().as_millisecond();
    let mut sink = TracingSink;
    let progress = match direction {
        Direction::Next => progression.manual_next(now, &mut sink),
        Direction::Prev => progression.manual_prev(now, &mut sink),
    };

    if let Some(t) = &progress.transition {
        println!("{}", format_transition(t));
    }
    match progression.hole() {
        Some(hole) => println!("{}", format_hole(hole)),
        None => println!("No hole"),
    }
    Ok(())
}

fn load_course(path: &Path) -> Result<Vec<HoleRef>, String> {
    trace::load_course(path).map_err(|e| format!("failed to load course {}: {e}", path.display()))
}

fn open_store(config: &Config) -> Result<SqliteStore, String> {
    let path = config
        .database_path()
        .ok_or("could not determine home directory")?;
    SqliteStore::open(&path).map_err(|e| format!("failed to open {}: {e}", path.display()))
}
