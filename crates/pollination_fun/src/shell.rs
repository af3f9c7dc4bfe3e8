use bevy::log::info;
use bevy::prelude::{Mut, NextState, State, World};
use garden_helpers::{RoundSummary, ShellMessageHandler};

use crate::controls::MoveIntent;
use crate::core::{ContactRegime, GameState};
use crate::game_over::GameOverContext;
use crate::session::SessionState;
use crate::storage::ActiveSettings;
use crate::ui::{ModalUI, dismiss_modal};

#[derive(Default, Clone, Copy)]
pub struct PollinationFun;

impl ShellMessageHandler for PollinationFun {
    fn round_duration(world: &mut World) -> u32 {
        world
            .resource::<ActiveSettings>()
            .0
            .difficulty
            .round_secs()
    }

    fn end(world: &mut World) -> RoundSummary {
        info!("Ending Pollination Fun");

        let summary = world.resource::<SessionState>().summary();
        let in_round = *world.resource::<State<GameState>>().get() == GameState::Playing;
        if in_round {
            // Forced teardown: the exit systems of `Playing` cancel every
            // session timer; the unfinished round is shown but not recorded.
            world.insert_resource(GameOverContext {
                summary,
                win: false,
                record_score: false,
            });
            let mut next_state = world.resource_mut::<NextState<GameState>>();
            next_state.set(GameState::GameOver);
        }
        summary
    }

    fn restart(world: &mut World) {
        info!("Restarting Pollination Fun");

        let mut next_state = world.resource_mut::<NextState<GameState>>();
        next_state.set(GameState::Playing);
    }

    fn modal_closed(world: &mut World) {
        world.resource_scope(|world, mut modal: Mut<ModalUI>| {
            world.resource_scope(|world, mut session: Mut<SessionState>| {
                world.resource_scope(|world, mut intent: Mut<MoveIntent>| {
                    let mut regime = world.resource_mut::<ContactRegime>();
                    dismiss_modal(&mut modal, &mut session, &mut intent, &mut regime);
                });
            });
        });
    }

    fn show_scores(world: &mut World) {
        world.insert_resource(GameOverContext {
            summary: RoundSummary::default(),
            win: false,
            record_score: false,
        });
        let mut next_state = world.resource_mut::<NextState<GameState>>();
        next_state.set(GameState::GameOver);
    }
}
