use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use yew::functional::Reducible;

/// Default round durations in milliseconds
pub mod defaults {
    pub const PLANT_DURATION_MS: u32 = 4_000;
    pub const DEFUSE_DURATION_MS: u32 = 10_000;
    pub const BOMB_TIMER_MS: u32 = 40_000;
}

/// High-resolution timestamp in milliseconds, as handed out by the frame clock.
pub type Timestamp = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BombStatus {
    Idle,
    Planting,
    Planted,
    Defusing,
    Defused,
    Exploded,
}

impl BombStatus {
    /// Round is over; only `Reset` leaves this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, BombStatus::Defused | BombStatus::Exploded)
    }

    /// A plant or defuse hold is in progress.
    pub fn is_hold_action(self) -> bool {
        matches!(self, BombStatus::Planting | BombStatus::Defusing)
    }

    /// Whether the frame clock has to keep ticking in this state.
    pub fn needs_clock(self) -> bool {
        matches!(
            self,
            BombStatus::Planting | BombStatus::Planted | BombStatus::Defusing
        )
    }
}

impl fmt::Display for BombStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BombStatus::Idle => "idle",
            BombStatus::Planting => "planting",
            BombStatus::Planted => "planted",
            BombStatus::Defusing => "defusing",
            BombStatus::Defused => "defused",
            BombStatus::Exploded => "exploded",
        };
        f.write_str(label)
    }
}

/// Everything that can be dispatched into the machine.
///
/// Timed completions (`PlantComplete`, `DefuseComplete`, `CountdownExpired`)
/// are never produced by [`transition`] itself; the host synthesizes them with
/// [`auto_event`] once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BombEvent {
    PlantStart { time: Timestamp },
    PlantCancel,
    PlantComplete { time: Timestamp },
    DefuseStart { time: Timestamp },
    DefuseCancel,
    DefuseComplete,
    CountdownExpired,
    Reset,
}

/// The three configurable durations of a round, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Durations {
    pub plant_duration: u32,
    pub defuse_duration: u32,
    pub bomb_timer: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            plant_duration: defaults::PLANT_DURATION_MS,
            defuse_duration: defaults::DEFUSE_DURATION_MS,
            bomb_timer: defaults::BOMB_TIMER_MS,
        }
    }
}

/// Caller-supplied replacements for the default durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationOverrides {
    pub plant_duration: Option<u32>,
    pub defuse_duration: Option<u32>,
    pub bomb_timer: Option<u32>,
}

impl From<Durations> for DurationOverrides {
    fn from(d: Durations) -> Self {
        Self {
            plant_duration: Some(d.plant_duration),
            defuse_duration: Some(d.defuse_duration),
            bomb_timer: Some(d.bomb_timer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombContext {
    /// When the current plant/defuse hold began.
    pub action_start: Option<Timestamp>,
    /// When planting finished, i.e. the start of the countdown.
    pub planted_at: Option<Timestamp>,
    pub plant_duration: u32,
    pub defuse_duration: u32,
    pub bomb_timer: u32,
}

impl BombContext {
    pub fn durations(&self) -> Durations {
        Durations {
            plant_duration: self.plant_duration,
            defuse_duration: self.defuse_duration,
            bomb_timer: self.bomb_timer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombMachine {
    pub status: BombStatus,
    pub context: BombContext,
}

/// Build a fresh idle machine, taking each duration from `overrides` when present.
pub fn create_initial_machine(overrides: DurationOverrides) -> BombMachine {
    let d = Durations::default();
    BombMachine {
        status: BombStatus::Idle,
        context: BombContext {
            action_start: None,
            planted_at: None,
            plant_duration: overrides.plant_duration.unwrap_or(d.plant_duration),
            defuse_duration: overrides.defuse_duration.unwrap_or(d.defuse_duration),
            bomb_timer: overrides.bomb_timer.unwrap_or(d.bomb_timer),
        },
    }
}

impl Default for BombMachine {
    fn default() -> Self {
        create_initial_machine(DurationOverrides::default())
    }
}

impl BombMachine {
    pub fn new(durations: Durations) -> Self {
        create_initial_machine(durations.into())
    }

    pub fn transition(&self, event: BombEvent) -> BombMachine {
        transition(self, event)
    }

    /// Panics in debug builds when `action_start`/`planted_at` disagree with `status`.
    pub fn debug_check_invariants(&self) {
        debug_assert_eq!(
            self.context.action_start.is_some(),
            self.status.is_hold_action(),
            "action_start must be set exactly while planting or defusing (status: {})",
            self.status
        );
        debug_assert_eq!(
            self.context.planted_at.is_some(),
            matches!(self.status, BombStatus::Planted | BombStatus::Defusing),
            "planted_at must be set exactly while planted or defusing (status: {})",
            self.status
        );
    }
}

/// Pure reducer: next machine for `event`. Events the current status does not
/// handle return the input unchanged.
pub fn transition(machine: &BombMachine, event: BombEvent) -> BombMachine {
    let ctx = machine.context;

    let next = match (machine.status, event) {
        (BombStatus::Idle, BombEvent::PlantStart { time }) => BombMachine {
            status: BombStatus::Planting,
            context: BombContext {
                action_start: Some(time),
                ..ctx
            },
        },

        (BombStatus::Planting, BombEvent::PlantCancel) => BombMachine {
            status: BombStatus::Idle,
            context: BombContext {
                action_start: None,
                ..ctx
            },
        },
        (BombStatus::Planting, BombEvent::PlantComplete { time }) => BombMachine {
            status: BombStatus::Planted,
            context: BombContext {
                action_start: None,
                planted_at: Some(time),
                ..ctx
            },
        },

        (BombStatus::Planted, BombEvent::DefuseStart { time }) => BombMachine {
            status: BombStatus::Defusing,
            context: BombContext {
                action_start: Some(time),
                ..ctx
            },
        },
        // planted_at only lives while planted or defusing.
        (BombStatus::Planted, BombEvent::CountdownExpired) => BombMachine {
            status: BombStatus::Exploded,
            context: BombContext {
                action_start: None,
                planted_at: None,
                ..ctx
            },
        },

        (BombStatus::Defusing, BombEvent::DefuseCancel) => BombMachine {
            status: BombStatus::Planted,
            context: BombContext {
                action_start: None,
                ..ctx
            },
        },
        (BombStatus::Defusing, BombEvent::DefuseComplete) => BombMachine {
            status: BombStatus::Defused,
            context: BombContext {
                action_start: None,
                planted_at: None,
                ..ctx
            },
        },

        (BombStatus::Defused | BombStatus::Exploded, BombEvent::Reset) => {
            create_initial_machine(ctx.durations().into())
        }

        _ => *machine,
    };

    next.debug_check_invariants();
    next
}

/// Milliseconds since the current hold began, never negative.
pub fn action_elapsed(context: &BombContext, now: Timestamp) -> Option<f64> {
    context.action_start.map(|start| (now - start).max(0.0))
}

/// Fraction `[0, 1]` of the plant hold completed.
pub fn plant_progress(context: &BombContext, now: Timestamp) -> f64 {
    let elapsed = action_elapsed(context, now).unwrap_or(0.0);
    (elapsed / f64::from(context.plant_duration)).min(1.0)
}

/// Fraction `[0, 1]` of the defuse hold completed.
pub fn defuse_progress(context: &BombContext, now: Timestamp) -> f64 {
    let elapsed = action_elapsed(context, now).unwrap_or(0.0);
    (elapsed / f64::from(context.defuse_duration)).min(1.0)
}

/// Countdown remaining in milliseconds; the full timer when nothing is planted.
pub fn bomb_time_left(context: &BombContext, now: Timestamp) -> f64 {
    let timer = f64::from(context.bomb_timer);
    match context.planted_at {
        None => timer,
        Some(planted_at) => (timer - (now - planted_at).max(0.0)).max(0.0),
    }
}

/// What the view needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    pub status: BombStatus,
    pub plant_progress: f64,
    pub defuse_progress: f64,
    pub bomb_time_left: f64,
}

pub fn render_state(machine: &BombMachine, now: Timestamp) -> RenderState {
    let ctx = &machine.context;
    RenderState {
        status: machine.status,
        plant_progress: plant_progress(ctx, now),
        defuse_progress: defuse_progress(ctx, now),
        bomb_time_left: bomb_time_left(ctx, now),
    }
}

/// The timed event, if any, the host should dispatch for this frame.
///
/// While defusing, both thresholds may have been crossed between two frames.
/// The instants of crossing decide: the defuser wins when the defuse finished
/// no later than the countdown. A lost defuse is released first with
/// `DefuseCancel`; the following frame then sees `Planted` with no time left
/// and yields `CountdownExpired`.
pub fn auto_event(machine: &BombMachine, now: Timestamp) -> Option<BombEvent> {
    let ctx = &machine.context;
    match machine.status {
        BombStatus::Planting if plant_progress(ctx, now) >= 1.0 => {
            Some(BombEvent::PlantComplete { time: now })
        }
        BombStatus::Planted if bomb_time_left(ctx, now) <= 0.0 => {
            Some(BombEvent::CountdownExpired)
        }
        BombStatus::Defusing => {
            let defused = defuse_progress(ctx, now) >= 1.0;
            let expired = bomb_time_left(ctx, now) <= 0.0;
            match (defused, expired) {
                (true, false) => Some(BombEvent::DefuseComplete),
                (false, true) => Some(BombEvent::DefuseCancel),
                (true, true) => {
                    let defused_at = ctx
                        .action_start
                        .map(|start| start + f64::from(ctx.defuse_duration));
                    let expired_at = ctx
                        .planted_at
                        .map(|planted| planted + f64::from(ctx.bomb_timer));
                    match (defused_at, expired_at) {
                        (Some(d), Some(e)) if d > e => Some(BombEvent::DefuseCancel),
                        _ => Some(BombEvent::DefuseComplete),
                    }
                }
                (false, false) => None,
            }
        }
        _ => None,
    }
}

/// Raw user intent, before it is interpreted against the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Press,
    Release,
    Reset,
}

/// Map a press/release/reset to the event it means in `status`.
pub fn intent_event(status: BombStatus, intent: Intent, now: Timestamp) -> Option<BombEvent> {
    match (intent, status) {
        (Intent::Press, BombStatus::Idle) => Some(BombEvent::PlantStart { time: now }),
        (Intent::Press, BombStatus::Planted) => Some(BombEvent::DefuseStart { time: now }),
        (Intent::Release, BombStatus::Planting) => Some(BombEvent::PlantCancel),
        (Intent::Release, BombStatus::Defusing) => Some(BombEvent::DefuseCancel),
        (Intent::Reset, _) => Some(BombEvent::Reset),
        _ => None,
    }
}

/// What the UI dispatches into its reducer cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BombAction {
    Event(BombEvent),
    /// Settings-driven reset; ignored mid-round.
    ApplySettings(settings::Settings),
}

impl From<BombEvent> for BombAction {
    fn from(event: BombEvent) -> Self {
        BombAction::Event(event)
    }
}

impl Reducible for BombMachine {
    type Action = BombAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = match action {
            BombAction::Event(event) => transition(&self, event),
            BombAction::ApplySettings(s) => match settings::apply_settings(&self, s) {
                Ok(next) => next,
                Err(_) => return self,
            },
        };
        if next == *self {
            debug!("Ignored {:?} while {}", action, self.status);
            return self;
        }

        debug!("{} --{:?}--> {}", self.status, action, next.status);
        match next.status {
            BombStatus::Defused => info!("Bomb defused"),
            BombStatus::Exploded => info!("Bomb exploded"),
            _ => {}
        }
        Rc::new(next)
    }
}

/// Format remaining countdown as `SS.t`, rounding up to the next tenth so the
/// display only reads `00.0` once the countdown is over.
pub fn format_countdown(ms: f64) -> String {
    let tenths = (ms.max(0.0) / 100.0).ceil() as u64;
    format!("{:02}.{}", tenths / 10, tenths % 10)
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn error_to_js(what: &str, e: impl fmt::Display) -> JsValue {
    to_js(&format!("Invalid {}: {}", what, e))
}

/// Initial machine for JavaScript hosts. `overrides_js` may be `undefined`.
#[wasm_bindgen]
pub fn bomb_initial_machine(overrides_js: JsValue) -> JsValue {
    if overrides_js.is_undefined() || overrides_js.is_null() {
        return to_js(&BombMachine::default());
    }
    match serde_wasm_bindgen::from_value::<DurationOverrides>(overrides_js) {
        Ok(overrides) => to_js(&create_initial_machine(overrides)),
        Err(e) => error_to_js("overrides", e),
    }
}

/// Reducer entry point for JavaScript hosts.
///
/// Returns the next machine, or an error string if either argument cannot be
/// decoded.
#[wasm_bindgen]
pub fn bomb_transition(machine_js: JsValue, event_js: JsValue) -> JsValue {
    let machine: BombMachine = match serde_wasm_bindgen::from_value(machine_js) {
        Ok(m) => m,
        Err(e) => return error_to_js("machine", e),
    };
    let event: BombEvent = match serde_wasm_bindgen::from_value(event_js) {
        Ok(ev) => ev,
        Err(e) => return error_to_js("event", e),
    };
    to_js(&transition(&machine, event))
}

#[wasm_bindgen]
pub fn bomb_render_state(machine_js: JsValue, now: f64) -> JsValue {
    match serde_wasm_bindgen::from_value::<BombMachine>(machine_js) {
        Ok(machine) => to_js(&render_state(&machine, now)),
        Err(e) => error_to_js("machine", e),
    }
}

pub mod clock;
pub mod settings;
