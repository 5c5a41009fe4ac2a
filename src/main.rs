//! Horde Lab headless runner
//!
//! Drives the simulation with the autopilot at a fixed step, no display.
//!
//! ```text
//! horde-lab [--settings <file>] run <ticks>
//! horde-lab [--settings <file>] record <ticks> <replay.json>
//! horde-lab [--settings <file>] replay <replay.json>
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use horde_lab::Settings;
use horde_lab::error::PersistError;
use horde_lab::highscores::{HighScoreEntry, HighScores};
use horde_lab::persistence::{ReplayPlayer, ReplayRecorder, load_replay, save_replay, save_snapshot};
use horde_lab::sim::{Command, RunPhase, World, autopilot_frame};
use horde_lab::telemetry::LogTelemetry;
use horde_lab::tuning::Config;

enum Mode {
    Run { ticks: u64 },
    Record { ticks: u64, path: PathBuf },
    Replay { path: PathBuf },
}

const USAGE: &str = "usage: horde-lab [--settings <file>] (run <ticks> | record <ticks> <replay.json> | replay <replay.json>)";

fn parse_args(args: &[String]) -> Result<(Mode, Option<PathBuf>), String> {
    let mut settings = None;
    let mut rest = Vec::new();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        if arg == "--settings" {
            let path = it.next().ok_or("--settings needs a file")?;
            settings = Some(PathBuf::from(path));
        } else {
            rest.push(arg.as_str());
        }
    }

    let ticks = |s: &str| {
        s.parse::<u64>()
            .map_err(|_| format!("invalid tick count: {s}"))
    };
    let mode = match rest.as_slice() {
        ["run", n] => Mode::Run { ticks: ticks(*n)? },
        ["record", n, path] => Mode::Record {
            ticks: ticks(*n)?,
            path: PathBuf::from(*path),
        },
        ["replay", path] => Mode::Replay {
            path: PathBuf::from(*path),
        },
        _ => return Err(USAGE.to_string()),
    };
    Ok((mode, settings))
}

fn make_world(settings: &Settings) -> World {
    World::from_settings(
        settings,
        Config::default(),
        Box::new(LogTelemetry::new(settings.telemetry_interval)),
    )
}

/// Log the finished run and put it on the board
fn finish_run(world: &World, scores: &mut HighScores, scores_path: &Path) {
    let entry = HighScoreEntry::from_state(world.state());
    log::info!(
        "run over: score {} ({} kills, {:.1}s, level {})",
        entry.score,
        entry.kills,
        entry.time_survived,
        entry.level
    );
    if let Some(rank) = scores.add(entry) {
        log::info!("new high score, rank {rank}");
        if let Err(e) = scores.save(scores_path) {
            log::warn!("could not save high scores: {e}");
        }
    }
}

fn run(settings: &Settings, ticks: u64) {
    let mut world = make_world(settings);
    let mut scores = HighScores::load(&settings.highscores_path);

    for _ in 0..ticks {
        if world.phase() == RunPhase::GameOver {
            finish_run(&world, &mut scores, &settings.highscores_path);
            world.enqueue(Command::Restart);
        }
        for cmd in autopilot_frame(world.state()).commands() {
            world.enqueue(cmd);
        }
        world.tick(settings.fixed_step);
    }

    if let Err(e) = save_snapshot(&world, &settings.snapshot_path) {
        log::warn!("final snapshot not written: {e}");
    }
    print_summary(&world);
}

fn record(settings: &Settings, ticks: u64, path: &Path) -> Result<(), PersistError> {
    let mut world = make_world(settings);
    let mut recorder = ReplayRecorder::start(&mut world, settings.fixed_step)?;

    for _ in 0..ticks {
        let mut frame = autopilot_frame(world.state());
        frame.restart = world.phase() == RunPhase::GameOver;
        recorder.record(&mut world, frame);
        world.tick(settings.fixed_step);
    }

    save_replay(path, &recorder.finish())?;
    print_summary(&world);
    Ok(())
}

fn replay(settings: &Settings, path: &Path) -> Result<(), PersistError> {
    let file = load_replay(path)?;
    let mut world = make_world(settings);
    let mut player = ReplayPlayer::new(file, &mut world)?;
    let dt = player.fixed_step();

    while player.next_frame(&mut world) {
        world.tick(dt);
    }
    print_summary(&world);
    Ok(())
}

fn print_summary(world: &World) {
    let stats = world.stats();
    let player = world.player();
    println!(
        "t={:.2}s level={} hp={:.1}/{:.1} kills={} spawned={} enemies={} phase={:?}",
        world.state().time_survived,
        player.level,
        player.hp,
        player.max_hp,
        stats.enemies_killed,
        stats.enemies_spawned,
        world.enemies().len(),
        world.phase()
    );
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (mode, settings_path) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };
    let settings = match settings_path {
        Some(path) => Settings::load(&path),
        None => Settings::default(),
    };
    log::info!("Horde Lab starting (seed {})", settings.seed);

    let result = match mode {
        Mode::Run { ticks } => {
            run(&settings, ticks);
            Ok(())
        }
        Mode::Record { ticks, path } => record(&settings, ticks, &path),
        Mode::Replay { path } => replay(&settings, &path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
