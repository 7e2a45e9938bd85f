//! Whole-round scenarios driven the way the UI drives the machine: one
//! auto-event check per frame plus user intents in between.

use bomb_timer::clock::{ClockSource, ManualClock};
use bomb_timer::{
    auto_event, bomb_time_left, create_initial_machine, intent_event, plant_progress,
    render_state, transition, BombEvent, BombMachine, BombStatus, DurationOverrides, Intent,
};

const FRAME_MS: f64 = 16.0;

/// Minimal host loop: owns the machine and checks for a timed event once per
/// frame time, never twice for the same `now`.
struct Host {
    machine: BombMachine,
    clock: ManualClock,
}

impl Host {
    fn new(machine: BombMachine, start: f64) -> Self {
        Self {
            machine,
            clock: ManualClock::new(start),
        }
    }

    fn dispatch(&mut self, event: BombEvent) {
        self.machine = transition(&self.machine, event);
    }

    fn intent(&mut self, intent: Intent) {
        if let Some(event) = intent_event(self.machine.status, intent, self.clock.now()) {
            self.dispatch(event);
        }
    }

    fn frame(&mut self) {
        if let Some(event) = auto_event(&self.machine, self.clock.now()) {
            self.dispatch(event);
        }
    }

    /// Advance frame by frame until `until` (inclusive).
    fn run_until(&mut self, until: f64) {
        while self.clock.now() + FRAME_MS <= until {
            self.clock.advance(FRAME_MS);
            self.frame();
        }
        if self.clock.now() < until {
            self.clock.set(until);
            self.frame();
        }
    }
}

#[test]
fn plant_completes_exactly_at_plant_duration() {
    let m = transition(&BombMachine::default(), BombEvent::PlantStart { time: 0.0 });

    assert_eq!(plant_progress(&m.context, 3_999.0), 0.99975);
    assert!(auto_event(&m, 3_999.0).is_none());
    assert_eq!(m.status, BombStatus::Planting);

    let event = auto_event(&m, 4_000.0).expect("plant should complete");
    let m = transition(&m, event);
    assert_eq!(m.status, BombStatus::Planted);
    assert_eq!(m.context.planted_at, Some(4_000.0));
    assert_eq!(m.context.action_start, None);
}

#[test]
fn planted_bomb_explodes_when_timer_runs_out() {
    let m = transition(&BombMachine::default(), BombEvent::PlantStart { time: 0.0 });
    let m = transition(&m, BombEvent::PlantComplete { time: 1_000.0 });

    assert_eq!(bomb_time_left(&m.context, 41_000.0), 0.0);
    assert_eq!(auto_event(&m, 41_000.0), Some(BombEvent::CountdownExpired));
    let m = transition(&m, BombEvent::CountdownExpired);
    assert_eq!(m.status, BombStatus::Exploded);
    assert_eq!(m.context.action_start, None);
}

#[test]
fn cancelled_plant_forgets_progress() {
    let m = transition(&BombMachine::default(), BombEvent::PlantStart { time: 500.0 });
    let m = transition(&m, BombEvent::PlantCancel);
    assert_eq!(m.status, BombStatus::Idle);
    assert_eq!(m.context.action_start, None);
    for now in [0.0, 500.0, 2_000.0, 1e9] {
        assert_eq!(plant_progress(&m.context, now), 0.0);
    }
}

#[test]
fn full_round_ends_defused_with_clean_context() {
    let m = BombMachine::default();
    let m = transition(&m, BombEvent::PlantStart { time: 0.0 });
    let m = transition(&m, BombEvent::PlantComplete { time: 4_000.0 });
    let m = transition(&m, BombEvent::DefuseStart { time: 5_000.0 });
    let m = transition(&m, BombEvent::DefuseComplete);
    assert_eq!(m.status, BombStatus::Defused);
    assert_eq!(m.context.action_start, None);
    assert_eq!(m.context.planted_at, None);
}

#[test]
fn host_loop_plays_a_defused_round() {
    let mut host = Host::new(BombMachine::default(), 100.0);
    host.intent(Intent::Press);
    assert_eq!(host.machine.status, BombStatus::Planting);

    host.run_until(4_100.0);
    assert_eq!(host.machine.status, BombStatus::Planted);
    // Letting go after the plant completed changes nothing.
    host.intent(Intent::Release);
    assert_eq!(host.machine.status, BombStatus::Planted);

    host.run_until(6_000.0);
    host.intent(Intent::Press);
    assert_eq!(host.machine.status, BombStatus::Defusing);

    host.run_until(15_000.0);
    assert_eq!(host.machine.status, BombStatus::Defusing);
    let rs = render_state(&host.machine, host.clock.now());
    assert!(rs.defuse_progress > 0.8 && rs.defuse_progress < 1.0);

    host.run_until(16_000.0);
    assert_eq!(host.machine.status, BombStatus::Defused);

    host.intent(Intent::Reset);
    assert_eq!(host.machine, BombMachine::default());
}

#[test]
fn host_loop_explodes_when_defuse_is_too_late() {
    let machine = create_initial_machine(DurationOverrides {
        plant_duration: Some(1_000),
        defuse_duration: Some(5_000),
        bomb_timer: Some(8_000),
    });
    let mut host = Host::new(machine, 0.0);
    host.intent(Intent::Press);
    host.run_until(1_000.0);
    assert_eq!(host.machine.status, BombStatus::Planted);

    // Countdown ends at 9_000; this defuse would finish at 9_500.
    host.run_until(4_500.0);
    host.intent(Intent::Press);
    host.run_until(9_000.0);
    assert_eq!(host.machine.status, BombStatus::Planted);

    host.run_until(9_016.0);
    assert_eq!(host.machine.status, BombStatus::Exploded);
}

#[test]
fn cancelled_defuse_keeps_countdown_running() {
    let mut host = Host::new(BombMachine::default(), 0.0);
    host.intent(Intent::Press);
    host.run_until(4_000.0);
    host.intent(Intent::Press);
    host.run_until(9_000.0);
    host.intent(Intent::Release);

    assert_eq!(host.machine.status, BombStatus::Planted);
    assert_eq!(host.machine.context.planted_at, Some(4_000.0));
    assert_eq!(bomb_time_left(&host.machine.context, 9_000.0), 35_000.0);
}

#[test]
fn reset_twice_from_exploded_is_stable() {
    let machine = create_initial_machine(DurationOverrides {
        plant_duration: Some(2_000),
        ..Default::default()
    });
    let m = transition(&machine, BombEvent::PlantStart { time: 0.0 });
    let m = transition(&m, BombEvent::PlantComplete { time: 2_000.0 });
    let exploded = transition(&m, BombEvent::CountdownExpired);

    let once = transition(&exploded, BombEvent::Reset);
    let twice = transition(&once, BombEvent::Reset);
    assert_eq!(once, machine);
    assert_eq!(twice, machine);
}

#[test]
fn lost_defuse_explodes_on_the_following_frame() {
    let machine = create_initial_machine(DurationOverrides {
        plant_duration: Some(1_000),
        defuse_duration: Some(5_000),
        bomb_timer: Some(2_000),
    });
    let mut host = Host::new(machine, 0.0);
    host.intent(Intent::Press);
    host.run_until(1_000.0);
    host.intent(Intent::Press);

    // Countdown runs out at 3_000 with the defuse at 40%.
    host.run_until(3_000.0);
    assert_eq!(host.machine.status, BombStatus::Planted);
    assert_eq!(bomb_time_left(&host.machine.context, 3_000.0), 0.0);

    host.clock.advance(FRAME_MS);
    host.frame();
    assert_eq!(host.machine.status, BombStatus::Exploded);
}
