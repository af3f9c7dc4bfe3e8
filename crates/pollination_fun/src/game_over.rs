use bevy::prelude::*;
use garden_helpers::{FONT, RoundSummary, WINDOW_HEIGHT, WINDOW_WIDTH};

use crate::core::GameState;
use crate::core::config::TOP_SCORES_SHOWN;
use crate::storage::{ScoreRecord, Storage, now_millis};

/// How the end screen was entered. Score recording is suppressed for
/// rounds cut short by the overlay page and for the plain score-board view.
#[derive(Resource, Default)]
pub struct GameOverContext {
    pub summary: RoundSummary,
    pub win: bool,
    pub record_score: bool,
}

#[derive(Component)]
pub struct GameOverScreen;

/// End-screen buttons.
#[derive(Component, Clone, Copy, PartialEq, Eq)]
pub enum GameOverButton {
    PlayAgain,
    Menu,
}

pub fn spawn_game_over_screen(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    context: Res<GameOverContext>,
    storage: Res<Storage>,
) {
    // Persist first so the fresh round shows up in its own board.
    let new_timestamp = if context.record_score {
        let record = ScoreRecord {
            score: context.summary.score,
            timestamp_ms: now_millis(),
            completed_flowers: context.summary.completed_flowers,
            total_time_secs: context.summary.total_time_secs,
        };
        storage.save_score_logged(record);
        Some(record.timestamp_ms)
    } else {
        None
    };
    let top_scores = storage.top_scores_logged(TOP_SCORES_SHOWN);

    commands.spawn((
        GameOverScreen,
        Sprite {
            color: Color::srgba(0.0, 0.0, 0.0, 0.8),
            custom_size: Some(Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 20.0),
    ));

    let title = if context.win {
        "Garden pollinated!"
    } else if context.record_score {
        "Time's up!"
    } else {
        "High scores"
    };

    let font = asset_server.load(FONT);
    let text_font = |size: f32| TextFont {
        font: font.clone(),
        font_size: size,
        ..default()
    };

    commands
        .spawn((
            GameOverScreen,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(10.0),
                padding: UiRect::top(Val::Px(60.0)),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((Text::new(title), text_font(36.0), TextColor(Color::WHITE)));

            if context.record_score {
                parent.spawn((
                    Text::new(format!(
                        "Score: {}\nFlowers pollinated: {}\nTime: {} s",
                        context.summary.score,
                        context.summary.completed_flowers,
                        context.summary.total_time_secs
                    )),
                    text_font(22.0),
                    TextColor(Color::WHITE),
                    TextLayout::new_with_justify(JustifyText::Center),
                ));
            }

            parent.spawn((
                Text::new("Best rounds"),
                text_font(24.0),
                TextColor(Color::srgb(1.0, 0.9, 0.4)),
                Node {
                    margin: UiRect::top(Val::Px(12.0)),
                    ..default()
                },
            ));

            if top_scores.is_empty() {
                parent.spawn((
                    Text::new("No rounds recorded yet"),
                    text_font(18.0),
                    TextColor(Color::srgb(0.7, 0.7, 0.7)),
                ));
            }

            for (rank, record) in top_scores.iter().enumerate() {
                let is_fresh = new_timestamp == Some(record.timestamp_ms);
                parent.spawn((
                    Text::new(format!(
                        "{}. {} pts - {} flowers - {} s",
                        rank + 1,
                        record.score,
                        record.completed_flowers,
                        record.total_time_secs
                    )),
                    text_font(18.0),
                    TextColor(if is_fresh {
                        Color::srgb(0.4, 1.0, 0.5)
                    } else {
                        Color::WHITE
                    }),
                ));
            }

            parent
                .spawn(Node {
                    column_gap: Val::Px(16.0),
                    margin: UiRect::top(Val::Px(24.0)),
                    ..default()
                })
                .with_children(|parent| {
                    for (label, button) in [
                        ("Play again", GameOverButton::PlayAgain),
                        ("Menu", GameOverButton::Menu),
                    ] {
                        parent
                            .spawn((
                                Node {
                                    width: Val::Px(140.0),
                                    height: Val::Px(48.0),
                                    justify_content: JustifyContent::Center,
                                    align_items: AlignItems::Center,
                                    ..default()
                                },
                                BackgroundColor(Color::srgb(0.1, 0.25, 0.12)),
                                Button,
                                button,
                            ))
                            .with_children(|parent| {
                                parent.spawn((
                                    Text::new(label),
                                    text_font(22.0),
                                    TextColor(Color::WHITE),
                                ));
                            });
                    }
                });
        });
}

pub fn handle_game_over_input(
    mut next_state: ResMut<NextState<GameState>>,
    mut interaction_query: Query<
        (&Interaction, &GameOverButton),
        (Changed<Interaction>, With<Button>),
    >,
) {
    for (interaction, button) in &mut interaction_query {
        if *interaction == Interaction::Pressed {
            next_state.set(match button {
                GameOverButton::PlayAgain => GameState::Playing,
                GameOverButton::Menu => GameState::Welcome,
            });
        }
    }
}

pub fn cleanup_game_over(mut commands: Commands, query: Query<Entity, With<GameOverScreen>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
