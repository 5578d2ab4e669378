//! Scripted walkthrough of the history subsystem
//!
//! This binary:
//! 1. Spawns a few movers with tracked `Position` and `Health`
//! 2. Simulates `REWIND_TICKS` ticks, ending each with a history boundary
//! 3. Rewinds to the start, then replays forward again
//!
//! History settings come from `REWIND_MAX_ENTRIES` and
//! `REWIND_COMMIT_BEFORE_UNDO`. Use `RUST_LOG=rewind_history=debug` to watch
//! the coordinator work.

use eyre::{WrapErr, ensure};
use rewind_ecs::prelude::*;
use rewind_event::prelude::*;
use rewind_history::prelude::*;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug)]
struct Velocity {
    x: f32,
    y: f32,
}

#[derive(Clone, Debug, PartialEq)]
struct Health(u32);

const DEFAULT_TICKS: u64 = 5;

fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rewind_sandbox=info".parse()?)
                .add_directive("rewind_history=info".parse()?),
        )
        .init();

    let ticks: u64 = std::env::var("REWIND_TICKS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    let config = HistoryConfig::from_env();
    info!(?config, ticks, "Starting rewind sandbox");

    let mut world = World::new();
    world.add_plugin(HistoryPlugin::new(config));
    world.track_history::<Position>();
    world.track_history::<Health>();

    let movers: Vec<Entity> = (0..3u8)
        .map(|i| {
            let e = world.spawn(Position {
                x: f32::from(i),
                y: 0.0,
            });
            world.insert(
                e,
                Velocity {
                    x: 1.0,
                    y: f32::from(i) * 0.5,
                },
            );
            world.insert(e, Health(100));
            e
        })
        .collect();
    boundary(&mut world, 0);
    let start = positions(&world, &movers);

    for tick in 1..=ticks {
        step(&mut world, &movers, tick);
        boundary(&mut world, tick);
    }
    let end = positions(&world, &movers);
    log_history(&world)?;

    let mut undone = 0u64;
    while undo(&mut world) {
        undone += 1;
    }
    info!(undone, "Rewound");

    // A full rewind also undoes the spawn boundary, which removes the
    // components entirely
    let full_rewind = undone == ticks + 1;
    if full_rewind {
        ensure!(
            movers.iter().all(|&e| !world.has::<Position>(e)),
            "rewinding past the first boundary should remove all positions"
        );
    } else {
        warn!(undone, "History was trimmed, partial rewind only");
    }

    let mut redone = 0;
    while redo(&mut world) {
        redone += 1;
        if full_rewind && redone == 1 {
            ensure!(
                positions(&world, &movers) == start,
                "first redo should restore the spawn positions"
            );
        }
    }
    info!(redone, "Replayed");

    ensure!(
        positions(&world, &movers) == end,
        "replaying every entry should restore the final positions"
    );
    info!("History round trip complete");
    Ok(())
}

/// Advance every mover by its velocity; every third tick a mover takes
/// damage and every fourth it loses its health component for good.
fn step(world: &mut World, movers: &[Entity], tick: u64) {
    for (i, &e) in movers.iter().enumerate() {
        let Some(velocity) = world.get::<Velocity>(e) else {
            continue;
        };
        if let Some(position) = world.get_mut::<Position>(e) {
            position.x += velocity.x;
            position.y += velocity.y;
        }
        world.patch::<Position>(e);

        let offset = tick + i as u64;
        if offset % 4 == 0 {
            world.remove::<Health>(e);
        } else if offset % 3 == 0 {
            if let Some(Health(hp)) = world.get::<Health>(e) {
                world.update(e, Health(hp.saturating_sub(10)));
            }
        }
    }
}

fn boundary(world: &mut World, timestamp: u64) {
    world.send(OnDeltaSnapshot { timestamp });
    world.flush_events();
}

fn undo(world: &mut World) -> bool {
    let before = cursor(world);
    world.send(UndoCommand);
    world.flush_events();
    cursor(world) != before
}

fn redo(world: &mut World) -> bool {
    let before = cursor(world);
    world.send(RedoCommand);
    world.flush_events();
    cursor(world) != before
}

fn cursor(world: &World) -> usize {
    world.history().map_or(0, |history| history.log().cursor())
}

fn positions(world: &World, movers: &[Entity]) -> Vec<Option<Position>> {
    movers.iter().map(|&e| world.get::<Position>(e)).collect()
}

fn log_history(world: &World) -> eyre::Result<()> {
    let Some(history) = world.history() else {
        warn!("No history coordinator installed");
        return Ok(());
    };

    for entry in history.log().iter() {
        let json = entry.to_json().wrap_err("failed to render history entry")?;
        info!(timestamp = entry.timestamp, "{}", serde_json::to_string(&json)?);
    }
    info!(
        entries = history.log().len(),
        types = history.registry().len(),
        "History recorded"
    );
    Ok(())
}
