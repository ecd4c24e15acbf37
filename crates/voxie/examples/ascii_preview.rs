//! ASCII Preview — headless run that prints each pattern as text.
//!
//! Uses a manual clock and scheduler, so the output is the same on every run.
//! Pass a config file path to preview a different grid:
//! `cargo run -p voxie --example ascii_preview -- my_indicator.json`

use std::time::Duration;

use voxie::prelude::*;

/// Frame spacing of the replayed schedule.
const FRAME_MS: u64 = 20;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match IndicatorConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => IndicatorConfig::default(),
    };

    let clock = ManualClock::new();
    let mut world = World::new();
    world.add_system("voxel_render", VoxelIndicatorRenderSystem::new());
    let mut indicator = VoxelIndicator::from_config(&config, clock.shared());
    indicator.create_pattern(Pattern::Idle);
    let id = world
        .spawn()
        .insert(indicator)
        .insert(Transform::IDENTITY)
        .id();

    let mut runner = Runner::new();
    for state in IndicatorState::ALL {
        if let Some(indicator) = world.get_mut::<VoxelIndicator>(id) {
            indicator.set_state(state);
        }

        // Long enough for the fade out, the settle delay and the slowest
        // appear sequence.
        let start = clock.now_ms() as u64;
        let mut scheduler = ManualScheduler::from_millis((0..150).map(|i| start + i * FRAME_MS));
        runner.start();
        runner.run_with(&mut world, &mut scheduler, |_, _| {
            clock.advance(FRAME_MS as f64);
        });

        if let Some(indicator) = world.get::<VoxelIndicator>(id) {
            print_indicator(indicator);
        }
    }

    log::info!(
        "previewed {} states over {:?}",
        IndicatorState::ALL.len(),
        Duration::from_millis(clock.now_ms() as u64)
    );
}

fn print_indicator(indicator: &VoxelIndicator) {
    let size = indicator.size();
    println!(
        "── {} ({} voxels lit) ──",
        indicator.state(),
        indicator.visible_count()
    );
    for z in 0..size.depth as i32 {
        if size.depth > 1 {
            println!("z = {z}");
        }
        for y in (0..size.height as i32).rev() {
            let row: String = (0..size.width as i32)
                .map(|x| match indicator.get_voxel(x, y, z) {
                    Some(v) if v.is_drawable() => shade(v.effective_brightness()),
                    _ => '·',
                })
                .collect();
            println!("  {row}");
        }
    }
    println!();
}

fn shade(brightness: f32) -> char {
    match brightness {
        b if b >= 0.75 => '█',
        b if b >= 0.5 => '▓',
        b if b >= 0.25 => '▒',
        _ => '░',
    }
}
