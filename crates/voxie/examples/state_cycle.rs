//! State Cycle — one indicator stepping through every state in real time.
//!
//! Snapshots go to `voxie-telemetry` on 127.0.0.1:9100; start it in another
//! terminal to watch the grid. `RUST_LOG=voxie=debug` shows the internals.

use std::sync::Arc;

use voxie::prelude::*;

/// Seconds each state is held before moving on.
const HOLD_SECS: f32 = 2.5;

/// System: walks its indicators through a fixed list of states, then stops
/// the runner.
struct StateScript {
    required: [ComponentType; 1],
    members: Membership,
    steps: Vec<IndicatorState>,
    next_step: usize,
    timer: f32,
    stop: StopHandle,
}

impl StateScript {
    fn new(steps: Vec<IndicatorState>, stop: StopHandle) -> Self {
        Self {
            required: [ComponentType::of::<VoxelIndicator>()],
            members: Membership::new(),
            steps,
            next_step: 0,
            timer: HOLD_SECS,
            stop,
        }
    }
}

impl System for StateScript {
    fn required_components(&self) -> &[ComponentType] {
        &self.required
    }

    fn add_entity(&mut self, entity: EntityId) {
        self.members.insert(entity);
    }

    fn remove_entity(&mut self, entity: EntityId) {
        self.members.remove(entity);
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.members.contains(entity)
    }

    fn update(&mut self, entities: &mut Entities, delta_secs: f32) {
        self.timer += delta_secs;
        if self.timer < HOLD_SECS {
            return;
        }
        self.timer = 0.0;

        let Some(&state) = self.steps.get(self.next_step) else {
            log::info!("script finished");
            self.stop.stop();
            return;
        };
        self.next_step += 1;

        for id in self.members.iter() {
            if let Some(indicator) = entities.component_mut::<VoxelIndicator>(id) {
                indicator.set_state(state);
            }
        }
    }
}

fn main() {
    init_logger();

    let config = IndicatorConfig::preset("standard").unwrap_or_default();
    let mut world = World::new();
    let mut runner = Runner::new();

    let mut steps = IndicatorState::ALL.to_vec();
    steps.push(IndicatorState::Idle);
    world.add_system("state_script", StateScript::new(steps, runner.stop_handle()));
    world.add_system("voxel_render", VoxelIndicatorRenderSystem::new());

    let indicator = VoxelIndicator::from_config(&config, Arc::new(SystemClock::new()));
    world.spawn().insert(indicator).insert(Transform::IDENTITY);

    let mut diag = match DiagSender::new() {
        Ok(sender) => Some(sender),
        Err(e) => {
            log::warn!("{e}; running without telemetry");
            None
        }
    };

    let mut scheduler = IntervalScheduler::new(config.update_rate);
    runner.start();
    let frames = runner.run_with(&mut world, &mut scheduler, |world, time| {
        if let Some(diag) = diag.as_mut() {
            diag.send(world, time);
        }
    });

    log::info!(
        "ran {frames} frames in {:.1}s",
        runner.time().elapsed_secs()
    );
}
