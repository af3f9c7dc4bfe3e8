use std::sync::{Arc, LazyLock};

use bevy::prelude::*;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MessageEvent;

/// A direction reported by the overlay page's on-screen pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadDirection {
    Up,
    Down,
    Left,
    Right,
}

impl PadDirection {
    pub const fn as_vec2(self) -> Vec2 {
        match self {
            Self::Up => Vec2::Y,
            Self::Down => Vec2::NEG_Y,
            Self::Left => Vec2::NEG_X,
            Self::Right => Vec2::X,
        }
    }
}

/// Final numbers of one round, handed to the end-of-round screen and the
/// overlay page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u32,
    pub completed_flowers: u32,
    pub total_time_secs: u32,
}

/// Messages the game publishes for the overlay page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayMessage {
    Ready,
    Parameters { duration_secs: u32 },
    SessionStarted { duration_secs: u32 },
    ScoreUpdated(u32),
    TimerUpdated(u32),
    FactRequested(String),
    ModalClosed,
    InputActiveChanged(bool),
    SessionEnded(RoundSummary),
}

/// Messages the overlay page sends into the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShellMessage {
    Parameters,
    Restart,
    End,
    ModalClosed,
    ShowScores,
    DirectionalInput { direction: PadDirection, pressed: bool },
}

pub static SHELL_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<ShellMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(not(target_arch = "wasm32"))]
pub static OVERLAY_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<OverlayMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(target_arch = "wasm32")]
pub fn listen_shell_messages() {
    let Some(window) = web_sys::window() else {
        error!("no global `window` exists, overlay messages are lost");
        return;
    };
    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        let message: Result<ShellMessage, serde_wasm_bindgen::Error> =
            serde_wasm_bindgen::from_value(event.data());

        let Ok(message) = message else {
            error!("Could not parse shell message {:?}", &event.data());
            return;
        };

        SHELL_MESSAGE_QUEUE.lock().push(message);
    }) as Box<dyn FnMut(MessageEvent)>);

    if window
        .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        .is_err()
    {
        error!("failed to add message event listener");
        return;
    }

    closure.forget(); // Leaks memory, but ensures the closure lives for the lifetime of the program
}

#[cfg(not(target_arch = "wasm32"))]
pub fn send_overlay_message(message: OverlayMessage) {
    OVERLAY_MESSAGE_QUEUE.lock().push(message);
}

#[cfg(target_arch = "wasm32")]
pub fn send_overlay_message(message: OverlayMessage) {
    let Some(window) = web_sys::window() else {
        error!("{message:?} not sent, no global `window` exists");
        return;
    };
    let Ok(message_js) = serde_wasm_bindgen::to_value(&message) else {
        error!("Could not serialize {message:?}");
        return;
    };

    let Ok(Some(parent_window)) = window.parent() else {
        error!("{message:?} not sent, parent window not found.");
        return;
    };

    if let Err(err) = parent_window.post_message(&message_js, "*") {
        error!("Could not post message {message_js:?}. {err:?}");
    };
}

/// Directional input relayed from the overlay's on-screen pad, drained by the
/// game's control systems once per frame.
#[derive(Resource, Default)]
pub struct ShellPadInput {
    events: Vec<(PadDirection, bool)>,
}

impl ShellPadInput {
    pub fn push(&mut self, direction: PadDirection, pressed: bool) {
        self.events.push((direction, pressed));
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, (PadDirection, bool)> {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// The lifecycle calls the overlay page can make on the game.
///
/// Implemented once per game; the functions are invoked by the link plugin
/// when the matching [`ShellMessage`] arrives, never called directly.
pub trait ShellMessageHandler: Send + Sync + Default + 'static {
    /// Duration of one round in seconds, for the overlay's own countdown UI.
    fn round_duration(world: &mut World) -> u32;
    /// The page is navigating away: tear the session down and report finals.
    fn end(world: &mut World) -> RoundSummary;
    /// Start a fresh round.
    fn restart(world: &mut World);
    /// The overlay dismissed the currently shown modal.
    fn modal_closed(world: &mut World);
    /// Enter the score board without recording anything.
    fn show_scores(world: &mut World);
}

fn process_shell_messages<T: ShellMessageHandler>(world: &mut World) {
    let messages = SHELL_MESSAGE_QUEUE.lock().drain(..).collect::<Vec<_>>();

    for message in messages {
        match message {
            ShellMessage::Parameters => {
                let duration_secs = T::round_duration(world);
                send_overlay_message(OverlayMessage::Parameters { duration_secs });
            }
            ShellMessage::End => {
                let summary = T::end(world);
                send_overlay_message(OverlayMessage::SessionEnded(summary));
            }
            ShellMessage::Restart => T::restart(world),
            ShellMessage::ModalClosed => T::modal_closed(world),
            ShellMessage::ShowScores => T::show_scores(world),
            ShellMessage::DirectionalInput { direction, pressed } => {
                let mut pad = world.resource_mut::<ShellPadInput>();
                pad.push(direction, pressed);
            }
        }
    }
}

fn ready() {
    send_overlay_message(OverlayMessage::Ready);
}

#[derive(Default)]
pub struct OverlayLinkPlugin<T: ShellMessageHandler>(core::marker::PhantomData<T>);

impl<T: ShellMessageHandler> Plugin for OverlayLinkPlugin<T> {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShellPadInput>();
        app.add_systems(PostUpdate, process_shell_messages::<T>);
        #[cfg(target_arch = "wasm32")]
        {
            app.add_systems(Startup, listen_shell_messages);
        }
        app.add_systems(PostStartup, ready);
    }
}
