#![allow(clippy::type_complexity)]

mod audio;
mod bonus;
mod catalog;
mod collection;
mod controls;
mod core;
mod game_over;
mod quiz;
mod session;
mod settings_menu;
mod shell;
mod storage;
mod ui;
mod welcome;

use bevy::prelude::*;
use garden_helpers::floating_score::animate_floating_scores;
use garden_helpers::welcome_screen::despawn_welcome_screen;
use leafwing_input_manager::prelude::*;
use shell::PollinationFun;

use crate::bonus::BonusChallenge;
use crate::catalog::FlowerCatalog;
use crate::controls::{MoveAction, MoveIntent};
use crate::core::{
    BonusResolvedEvent, CollectedEvent, ContactRegime, DeliveredEvent, GameState, RoundEndedEvent,
};
use crate::game_over::GameOverContext;
use crate::quiz::QuizBank;
use crate::session::{FlowerArena, FlowersDimmed, SessionState};
use crate::storage::{ActiveSettings, Storage};

pub fn run() {
    let storage = Storage::for_target();
    let settings = storage.settings_logged();
    let catalog = FlowerCatalog::from_records(&storage.discovery_logged());

    let mut app = garden_helpers::get_default_app::<PollinationFun>(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );

    app.init_state::<GameState>()
        .add_plugins(InputManagerPlugin::<MoveAction>::default())
        .add_plugins(ui::GameUiPlugin)
        .add_plugins(audio::GameAudioPlugin)
        .insert_resource(storage)
        .insert_resource(ActiveSettings(settings))
        .insert_resource(catalog)
        .init_resource::<QuizBank>()
        .init_resource::<FlowerArena>()
        .init_resource::<SessionState>()
        .init_resource::<MoveIntent>()
        .init_resource::<ContactRegime>()
        .init_resource::<FlowersDimmed>()
        .init_resource::<BonusChallenge>()
        .init_resource::<GameOverContext>()
        .add_event::<CollectedEvent>()
        .add_event::<DeliveredEvent>()
        .add_event::<BonusResolvedEvent>()
        .add_event::<RoundEndedEvent>()
        .add_systems(Startup, setup)
        .add_systems(OnEnter(GameState::Welcome), welcome::spawn_title_screen)
        .add_systems(OnExit(GameState::Welcome), despawn_welcome_screen)
        .add_systems(
            OnEnter(GameState::Playing),
            (
                session::spawn_session,
                controls::spawn_virtual_pad,
                bonus::reset_bonus,
            ),
        )
        .add_systems(
            OnExit(GameState::Playing),
            (session::cleanup_session, bonus::reset_bonus),
        )
        .add_systems(
            OnEnter(GameState::Settings),
            settings_menu::spawn_settings_screen,
        )
        .add_systems(
            OnExit(GameState::Settings),
            settings_menu::cleanup_settings_screen,
        )
        .add_systems(
            OnEnter(GameState::Collection),
            collection::spawn_collection_screen,
        )
        .add_systems(
            OnExit(GameState::Collection),
            collection::cleanup_collection_screen,
        )
        .add_systems(
            OnEnter(GameState::GameOver),
            game_over::spawn_game_over_screen,
        )
        .add_systems(OnExit(GameState::GameOver), game_over::cleanup_game_over)
        .add_systems(
            Update,
            (
                welcome::handle_title_input.run_if(in_state(GameState::Welcome)),
                settings_menu::handle_settings_input.run_if(in_state(GameState::Settings)),
                collection::handle_collection_input.run_if(in_state(GameState::Collection)),
                game_over::handle_game_over_input.run_if(in_state(GameState::GameOver)),
                animate_floating_scores,
            ),
        )
        .add_systems(
            Update,
            (
                // Input flows into movement before any contact check; the
                // two contact systems are mutually exclusive by regime.
                (
                    controls::read_keyboard,
                    controls::read_shell_pad,
                    controls::update_virtual_pad,
                    session::move_bee,
                    session::gameplay_contacts
                        .run_if(|regime: Res<ContactRegime>| *regime == ContactRegime::Gameplay),
                    bonus::bonus_answer_contacts
                        .run_if(|regime: Res<ContactRegime>| *regime == ContactRegime::Challenge),
                )
                    .chain(),
                session::update_countdown,
                bonus::schedule_bonus,
                bonus::prepare_bonus,
                bonus::bonus_timeout,
                bonus::bonus_cleanup,
                session::sync_flower_visuals,
                session::finish_round,
                ui::handle_modal_input,
            )
                .run_if(in_state(GameState::Playing)),
        )
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}
