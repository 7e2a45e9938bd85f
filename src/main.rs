//! Main module for the bomb timer application using Yew.
//! Owns the single bomb machine, drives it from the frame clock and wires the
//! view components.

use bomb_timer::clock::{ClockSource, PerformanceClock};
use bomb_timer::settings::{can_apply, check_settings, Settings};
use bomb_timer::{auto_event, intent_event, render_state, BombAction, BombMachine, Intent};
use log::debug;
use yew::prelude::*;

mod components;
mod config;
mod hooks;
mod utils;

use components::{game_over_image, game_over_message, BombWidget, GameOver, SettingsOverlay};
use config::TITLE;
use hooks::use_animation_frame;

/// Primary application component: one machine, one frame clock.
#[function_component(Main)]
fn main_component() -> Html {
    let machine = use_reducer_eq(BombMachine::default);
    let now = use_animation_frame(machine.status.needs_clock());
    let settings_error = use_state(|| None::<AttrValue>);

    // At most one timed event per frame
    {
        let machine = machine.clone();
        use_effect_with(now, move |&now| {
            if let Some(event) = auto_event(&machine, now) {
                debug!("Frame at {:.1} ms synthesized {:?}", now, event);
                machine.dispatch(event.into());
            }
            || ()
        });
    }

    let dispatch_intent = {
        let machine = machine.clone();
        Callback::from(move |intent: Intent| {
            let now = PerformanceClock.now();
            if let Some(event) = intent_event(machine.status, intent, now) {
                machine.dispatch(event.into());
            }
        })
    };

    let on_press = dispatch_intent.reform(|_: ()| Intent::Press);
    let on_release = dispatch_intent.reform(|_: ()| Intent::Release);
    let on_reset = dispatch_intent.reform(|_: ()| Intent::Reset);

    let on_apply = {
        let machine = machine.clone();
        let settings_error = settings_error.clone();
        Callback::from(move |settings: Settings| {
            match check_settings(machine.status, settings) {
                Ok(_) => {
                    settings_error.set(None);
                    machine.dispatch(BombAction::ApplySettings(settings));
                }
                Err(e) => settings_error.set(Some(e.to_string().into())),
            }
        })
    };

    let render = render_state(&machine, now);

    html! {
        <main class="app">
            <h1 class="title">{ TITLE }</h1>
            <BombWidget {render} {on_press} {on_release} />
            if let Some(message) = game_over_message(machine.status) {
                <GameOver
                    message={message}
                    image={game_over_image(machine.status).map(AttrValue::from)}
                    on_reset={Some(on_reset)}
                />
            }
            <SettingsOverlay
                current={machine.context.durations()}
                can_apply={can_apply(machine.status)}
                error={(*settings_error).clone()}
                {on_apply}
            />
        </main>
    }
}

/// Entry point: installs the panic hook and mounts the app.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<Main>::new().render();
}
