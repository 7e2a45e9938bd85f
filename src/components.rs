//! Yew view components for the bomb widget.
//!
//! Everything here renders from props only; the machine lives in `main.rs`.

use crate::config::{
    BOMB_IMAGE, DEBOUNCE_MS, DEFUSED_MESSAGE, DEFUSE_HINT, EXPLODED_MESSAGE, EXPLOSION_IMAGE,
    PLANT_HINT,
};
use crate::hooks::use_validated_input;
use crate::utils::validate_duration;
use bomb_timer::settings::Settings;
use bomb_timer::{format_countdown, BombStatus, RenderState};
use std::rc::Rc;
use yew::prelude::*;

/// Instruction line shown under the bomb, if any.
pub fn instruction_text(status: BombStatus) -> Option<&'static str> {
    match status {
        BombStatus::Idle => Some(PLANT_HINT),
        BombStatus::Planted => Some(DEFUSE_HINT),
        _ => None,
    }
}

pub fn shows_countdown(status: BombStatus) -> bool {
    matches!(status, BombStatus::Planted | BombStatus::Defusing)
}

pub fn shows_progress(status: BombStatus) -> bool {
    status.is_hold_action()
}

/// Progress of whichever hold is running.
pub fn active_progress(render: &RenderState) -> f64 {
    match render.status {
        BombStatus::Planting => render.plant_progress,
        BombStatus::Defusing => render.defuse_progress,
        _ => 0.0,
    }
}

pub fn game_over_message(status: BombStatus) -> Option<&'static str> {
    match status {
        BombStatus::Defused => Some(DEFUSED_MESSAGE),
        BombStatus::Exploded => Some(EXPLODED_MESSAGE),
        _ => None,
    }
}

/// Overlay artwork for the finished round.
pub fn game_over_image(status: BombStatus) -> Option<&'static str> {
    match status {
        BombStatus::Exploded => Some(EXPLOSION_IMAGE),
        _ => None,
    }
}

#[derive(Properties, PartialEq)]
pub struct ProgressBarProps {
    /// Completed fraction in `[0, 1]`.
    pub fraction: f64,
    pub label: AttrValue,
}

#[function_component(ProgressBar)]
pub fn progress_bar(props: &ProgressBarProps) -> Html {
    let pct = (props.fraction.clamp(0.0, 1.0) * 100.0).round();
    html! {
        <div class="progress">
            <span class="progress-label">{ props.label.clone() }</span>
            <div class="progress-track">
                <div class="progress-fill" style={format!("width: {}%", pct)} />
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CountdownProps {
    pub time_left_ms: f64,
}

#[function_component(Countdown)]
pub fn countdown(props: &CountdownProps) -> Html {
    let urgent = props.time_left_ms < 10_000.0;
    html! {
        <div class={classes!("countdown", urgent.then_some("urgent"))}>
            { format_countdown(props.time_left_ms) }
        </div>
    }
}

/// The pressable bomb plus status-gated timer, progress bar and hint.
#[derive(Properties, PartialEq)]
pub struct BombWidgetProps {
    pub render: RenderState,
    pub on_press: Callback<()>,
    pub on_release: Callback<()>,
}

#[function_component(BombWidget)]
pub fn bomb_widget(props: &BombWidgetProps) -> Html {
    let status = props.render.status;

    let onpointerdown = {
        let on_press = props.on_press.clone();
        Callback::from(move |e: PointerEvent| {
            e.prevent_default();
            on_press.emit(());
        })
    };
    // Leaving the widget or losing the pointer counts as letting go.
    let release = {
        let on_release = props.on_release.clone();
        Callback::from(move |_: PointerEvent| on_release.emit(()))
    };
    let oncontextmenu = Callback::from(|e: MouseEvent| e.prevent_default());

    let progress_label = match status {
        BombStatus::Defusing => "Defusing",
        _ => "Planting",
    };

    html! {
        <div class={classes!("bomb-widget", status.to_string())}>
            if shows_countdown(status) {
                <Countdown time_left_ms={props.render.bomb_time_left} />
            }
            <div class="bomb"
                {onpointerdown}
                onpointerup={release.clone()}
                onpointerleave={release.clone()}
                onpointercancel={release}
                {oncontextmenu}
            >
                <img src={BOMB_IMAGE} alt="Image of CSGO bomb" draggable="false" />
            </div>
            if shows_progress(status) {
                <ProgressBar fraction={active_progress(&props.render)} label={progress_label} />
            }
            if let Some(hint) = instruction_text(status) {
                <p class="instructions">{ hint }</p>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct GameOverProps {
    pub message: AttrValue,
    #[prop_or_default]
    pub image: Option<AttrValue>,
    #[prop_or_default]
    pub on_reset: Option<Callback<()>>,
}

#[function_component(GameOver)]
pub fn game_over(props: &GameOverProps) -> Html {
    html! {
        <div class="game-over">
            if let Some(src) = props.image.clone() {
                <img class="game-over-image" {src} alt="Explosion" />
            }
            <h1>{ props.message.clone() }</h1>
            if let Some(on_reset) = props.on_reset.clone() {
                <button onclick={Callback::from(move |_| on_reset.emit(()))}>
                    { "Restart" }
                </button>
            }
        </div>
    }
}

/// One labelled duration field with its validation error.
#[derive(Properties, PartialEq)]
struct DurationFieldProps {
    label: AttrValue,
    text: AttrValue,
    error: Option<AttrValue>,
    oninput: Callback<InputEvent>,
    on_commit: Callback<()>,
}

#[function_component(DurationField)]
fn duration_field(props: &DurationFieldProps) -> Html {
    let onchange = {
        let on_commit = props.on_commit.clone();
        Callback::from(move |_: Event| on_commit.emit(()))
    };
    let onkeydown = {
        let on_commit = props.on_commit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                on_commit.emit(());
            }
        })
    };
    html! {
        <div class="form-group">
            <label>{ props.label.clone() }</label>
            <input type="text"
                value={props.text.clone()}
                oninput={props.oninput.clone()}
                {onchange}
                {onkeydown}
            />
            if let Some(err) = props.error.clone() {
                <div class="field-error">{ err }</div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SettingsOverlayProps {
    pub current: Settings,
    /// Apply is refused mid-round.
    pub can_apply: bool,
    pub error: Option<AttrValue>,
    pub on_apply: Callback<Settings>,
}

/// Floating settings button plus bottom drawer with the three durations.
#[function_component(SettingsOverlay)]
pub fn settings_overlay(props: &SettingsOverlayProps) -> Html {
    let is_open = use_state(|| false);
    let plant = use_validated_input(
        props.current.plant_duration,
        Rc::new(|s: &str| validate_duration(s, "Plant time")),
        DEBOUNCE_MS,
    );
    let defuse = use_validated_input(
        props.current.defuse_duration,
        Rc::new(|s: &str| validate_duration(s, "Defuse time")),
        DEBOUNCE_MS,
    );
    let timer = use_validated_input(
        props.current.bomb_timer,
        Rc::new(|s: &str| validate_duration(s, "Bomb timer")),
        DEBOUNCE_MS,
    );

    // Reopening the drawer shows what is actually in effect.
    let toggle = {
        let is_open = is_open.clone();
        let current = props.current;
        let (plant_set, defuse_set, timer_set) = (
            plant.set_value.clone(),
            defuse.set_value.clone(),
            timer.set_value.clone(),
        );
        Callback::from(move |_: MouseEvent| {
            if !*is_open {
                plant_set.emit(current.plant_duration);
                defuse_set.emit(current.defuse_duration);
                timer_set.emit(current.bomb_timer);
            }
            is_open.set(!*is_open);
        })
    };

    let has_errors = plant.error.is_some() || defuse.error.is_some() || timer.error.is_some();
    let on_apply = {
        let is_open = is_open.clone();
        let on_apply = props.on_apply.clone();
        let settings = Settings {
            plant_duration: plant.value,
            defuse_duration: defuse.value,
            bomb_timer: timer.value,
        };
        Callback::from(move |_: MouseEvent| {
            on_apply.emit(settings);
            is_open.set(false);
        })
    };

    html! {
        <>
            if !*is_open {
                <button class="settings-button" title="Settings" onclick={toggle.clone()}>
                    { "⚙" }
                </button>
            }
            <div class={classes!("settings-drawer", is_open.then_some("open"))}>
                <h2>{ "Game Settings" }</h2>
                <DurationField label="Plant Time"
                    text={plant.text.clone()}
                    error={plant.error.clone().map(AttrValue::from)}
                    oninput={plant.on_text_input.clone()}
                    on_commit={plant.on_commit.clone()}
                />
                <DurationField label="Defuse Time"
                    text={defuse.text.clone()}
                    error={defuse.error.clone().map(AttrValue::from)}
                    oninput={defuse.on_text_input.clone()}
                    on_commit={defuse.on_commit.clone()}
                />
                <DurationField label="Bomb Timer"
                    text={timer.text.clone()}
                    error={timer.error.clone().map(AttrValue::from)}
                    oninput={timer.on_text_input.clone()}
                    on_commit={timer.on_commit.clone()}
                />
                if !props.can_apply {
                    <div class="settings-note">{ "Settings can be changed once the round is over." }</div>
                }
                if let Some(err) = props.error.clone() {
                    <div class="current-error">{ err }</div>
                }
                <div class="settings-actions">
                    <button class="btn-secondary" onclick={toggle}>{ "Close" }</button>
                    <button disabled={has_errors || !props.can_apply} onclick={on_apply}>
                        { "Apply" }
                    </button>
                </div>
            </div>
        </>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(status: BombStatus, plant: f64, defuse: f64) -> RenderState {
        RenderState {
            status,
            plant_progress: plant,
            defuse_progress: defuse,
            bomb_time_left: 40_000.0,
        }
    }

    #[test]
    fn visibility_follows_status() {
        use BombStatus::*;
        assert_eq!(instruction_text(Idle), Some(PLANT_HINT));
        assert_eq!(instruction_text(Planted), Some(DEFUSE_HINT));
        assert_eq!(instruction_text(Defusing), None);

        assert!(shows_countdown(Planted) && shows_countdown(Defusing));
        assert!(!shows_countdown(Idle) && !shows_countdown(Planting));
        assert!(!shows_countdown(Exploded));

        assert!(shows_progress(Planting) && shows_progress(Defusing));
        assert!(!shows_progress(Planted));

        assert_eq!(game_over_message(Defused), Some(DEFUSED_MESSAGE));
        assert_eq!(game_over_message(Exploded), Some(EXPLODED_MESSAGE));
        assert_eq!(game_over_message(Planted), None);
    }

    #[test]
    fn explosion_art_only_when_exploded() {
        assert_eq!(game_over_image(BombStatus::Exploded), Some(EXPLOSION_IMAGE));
        assert_eq!(game_over_image(BombStatus::Defused), None);
        assert_eq!(game_over_image(BombStatus::Planted), None);
    }

    #[test]
    fn referenced_images_ship_with_the_app() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        for image in [BOMB_IMAGE, EXPLOSION_IMAGE] {
            assert!(root.join(image).is_file(), "missing {}", image);
        }
    }

    #[test]
    fn progress_bar_tracks_running_hold() {
        assert_eq!(active_progress(&render(BombStatus::Planting, 0.25, 0.0)), 0.25);
        assert_eq!(active_progress(&render(BombStatus::Defusing, 0.0, 0.75)), 0.75);
        assert_eq!(active_progress(&render(BombStatus::Planted, 1.0, 1.0)), 0.0);
    }
}
