use bomb_timer::clock::{ClockSource, MonotonicClock, PerformanceClock};
use bomb_timer::Timestamp;
use gloo_render::{request_animation_frame, AnimationFrame};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Holds the state and callbacks for a validated input field.
#[derive(Clone)]
pub struct ValidatedInput<T: Clone + PartialEq + 'static> {
    /// The current text content of the input field.
    pub text: String,
    /// The last successfully parsed value.
    pub value: T,
    /// An optional error message if validation failed.
    pub error: Option<String>,
    /// Callback for the text input's `oninput` event. Updates the text and
    /// commits it once typing pauses for `debounce_ms`.
    pub on_text_input: Callback<InputEvent>,
    /// Callback to parse and validate the current text right away.
    /// Typically used with `onchange` or after an Enter key press.
    pub on_commit: Callback<()>,
    /// Callback to programmatically set the value.
    /// This will also update the text representation and clear any errors.
    pub set_value: Callback<T>,
}

/// Custom hook to manage state for a validated input field.
#[hook]
pub fn use_validated_input<T: Clone + PartialEq + std::fmt::Display + 'static>(
    initial_value: T,
    parse_and_validate: Rc<dyn Fn(&str) -> Result<T, String>>,
    debounce_ms: u32,
) -> ValidatedInput<T> {
    let value_handle: UseStateHandle<T> = use_state(|| initial_value.clone());
    let text_handle: UseStateHandle<String> = use_state(|| initial_value.to_string());
    let error_handle: UseStateHandle<Option<String>> = use_state(|| None::<String>);
    // Pending debounced commit; replacing it cancels the previous one.
    let pending = use_mut_ref(|| None::<Timeout>);

    let commit_text = {
        let value_setter = value_handle.clone();
        let text_setter = text_handle.clone();
        let error_setter = error_handle.clone();
        Callback::from(move |text: String| match parse_and_validate(&text) {
            Ok(parsed_val) => {
                value_setter.set(parsed_val.clone());
                text_setter.set(parsed_val.to_string()); // Update text to canonical form
                error_setter.set(None);
            }
            Err(err_msg) => {
                error_setter.set(Some(err_msg));
            }
        })
    };

    let on_text_input = {
        let text_setter = text_handle.clone();
        let pending = pending.clone();
        let commit_text = commit_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let text = input.value();
            text_setter.set(text.clone());

            let commit_text = commit_text.clone();
            let timer = Timeout::new(debounce_ms, move || commit_text.emit(text));
            *pending.borrow_mut() = Some(timer);
        })
    };

    let on_commit = {
        let current_text = (*text_handle).clone();
        let pending = pending.clone();
        Callback::from(move |_| {
            pending.borrow_mut().take();
            commit_text.emit(current_text.clone());
        })
    };

    let set_value = {
        let value_setter = value_handle.clone();
        let text_setter = text_handle.clone();
        let error_setter = error_handle.clone();
        Callback::from(move |new_val: T| {
            pending.borrow_mut().take();
            value_setter.set(new_val.clone());
            text_setter.set(new_val.to_string());
            error_setter.set(None); // Assume programmatic set is valid
        })
    };

    ValidatedInput {
        text: (*text_handle).clone(),
        value: (*value_handle).clone(),
        error: (*error_handle).clone(),
        on_text_input,
        on_commit,
        set_value,
    }
}

type FrameSlot = Rc<RefCell<Option<AnimationFrame>>>;

/// Current frame timestamp, refreshed on every animation frame while `enabled`.
///
/// Exactly one frame request is outstanding at a time. Disabling (or
/// unmounting) drops it, which cancels the request, and resets the monotonic
/// base so the next enabled period starts fresh.
#[hook]
pub fn use_animation_frame(enabled: bool) -> Timestamp {
    let now = use_state(|| PerformanceClock.now());
    let clock = use_memo((), |_| MonotonicClock::new());

    {
        let now = now.clone();
        use_effect_with(enabled, move |&enabled| {
            let slot: FrameSlot = Rc::new(RefCell::new(None));
            if enabled {
                schedule_frame(slot.clone(), clock.clone(), now);
            }
            move || {
                slot.borrow_mut().take();
                clock.disable();
            }
        });
    }

    *now
}

fn schedule_frame(slot: FrameSlot, clock: Rc<MonotonicClock>, now: UseStateHandle<Timestamp>) {
    let next_slot = slot.clone();
    let handle = request_animation_frame(move |timestamp| {
        now.set(clock.observe(timestamp));
        schedule_frame(next_slot, clock, now);
    });
    *slot.borrow_mut() = Some(handle);
}
