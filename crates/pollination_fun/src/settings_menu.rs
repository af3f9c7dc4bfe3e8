use bevy::prelude::*;
use garden_helpers::{FONT, WINDOW_HEIGHT, WINDOW_WIDTH};

use crate::core::GameState;
use crate::storage::{ActiveSettings, MAX_VOLUME, Storage};

#[derive(Component)]
pub struct SettingsScreenElement;

/// One press-able adjustment on the settings screen.
#[derive(Component, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    MusicDown,
    MusicUp,
    EffectsDown,
    EffectsUp,
    CycleDifficulty,
    ToggleFacts,
    Back,
}

#[derive(Component)]
pub(crate) struct MusicValueText;

#[derive(Component)]
pub(crate) struct EffectsValueText;

#[derive(Component)]
pub(crate) struct DifficultyValueText;

#[derive(Component)]
pub(crate) struct FactsValueText;

fn facts_label(show_facts: bool) -> &'static str {
    if show_facts { "On" } else { "Off" }
}

pub fn spawn_settings_screen(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<ActiveSettings>,
) {
    commands.spawn((
        Sprite::from_color(
            Color::srgb(0.03, 0.09, 0.04),
            Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT),
        ),
        SettingsScreenElement,
    ));

    let font = asset_server.load(FONT);
    let text_font = |size: f32| TextFont {
        font: font.clone(),
        font_size: size,
        ..default()
    };

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(18.0),
                padding: UiRect::top(Val::Px(50.0)),
                ..default()
            },
            SettingsScreenElement,
        ))
        .with_children(|parent| {
            parent.spawn((Text::new("Settings"), text_font(36.0), TextColor(Color::WHITE)));

            // Music volume row
            parent
                .spawn(Node {
                    column_gap: Val::Px(12.0),
                    align_items: AlignItems::Center,
                    ..default()
                })
                .with_children(|parent| {
                    parent.spawn((Text::new("Music"), text_font(22.0), TextColor(Color::WHITE)));
                    spawn_small_button(parent, &font, "-", SettingsAction::MusicDown);
                    parent.spawn((
                        Text::new(settings.0.music_volume.to_string()),
                        text_font(22.0),
                        TextColor(Color::srgb(1.0, 0.9, 0.4)),
                        MusicValueText,
                    ));
                    spawn_small_button(parent, &font, "+", SettingsAction::MusicUp);
                });

            // Effects volume row
            parent
                .spawn(Node {
                    column_gap: Val::Px(12.0),
                    align_items: AlignItems::Center,
                    ..default()
                })
                .with_children(|parent| {
                    parent.spawn((Text::new("Effects"), text_font(22.0), TextColor(Color::WHITE)));
                    spawn_small_button(parent, &font, "-", SettingsAction::EffectsDown);
                    parent.spawn((
                        Text::new(settings.0.effects_volume.to_string()),
                        text_font(22.0),
                        TextColor(Color::srgb(1.0, 0.9, 0.4)),
                        EffectsValueText,
                    ));
                    spawn_small_button(parent, &font, "+", SettingsAction::EffectsUp);
                });

            // Difficulty row
            parent
                .spawn(Node {
                    column_gap: Val::Px(12.0),
                    align_items: AlignItems::Center,
                    ..default()
                })
                .with_children(|parent| {
                    parent.spawn((
                        Text::new("Difficulty"),
                        text_font(22.0),
                        TextColor(Color::WHITE),
                    ));
                    spawn_wide_button(
                        parent,
                        &font,
                        settings.0.difficulty.label(),
                        SettingsAction::CycleDifficulty,
                        DifficultyValueText,
                    );
                });

            // Fact popup row
            parent
                .spawn(Node {
                    column_gap: Val::Px(12.0),
                    align_items: AlignItems::Center,
                    ..default()
                })
                .with_children(|parent| {
                    parent.spawn((
                        Text::new("Flower facts"),
                        text_font(22.0),
                        TextColor(Color::WHITE),
                    ));
                    spawn_wide_button(
                        parent,
                        &font,
                        facts_label(settings.0.show_facts),
                        SettingsAction::ToggleFacts,
                        FactsValueText,
                    );
                });

            parent
                .spawn((
                    Node {
                        width: Val::Px(140.0),
                        height: Val::Px(48.0),
                        margin: UiRect::top(Val::Px(30.0)),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.1, 0.25, 0.12)),
                    Button,
                    SettingsAction::Back,
                ))
                .with_children(|parent| {
                    parent.spawn((Text::new("Back"), text_font(24.0), TextColor(Color::WHITE)));
                });
        });
}

fn spawn_small_button(
    parent: &mut ChildBuilder<'_>,
    font: &Handle<Font>,
    label: &str,
    action: SettingsAction,
) {
    parent
        .spawn((
            Node {
                width: Val::Px(36.0),
                height: Val::Px(36.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgb(0.1, 0.25, 0.12)),
            Button,
            action,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(label),
                TextFont {
                    font: font.clone(),
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn spawn_wide_button<M: Component>(
    parent: &mut ChildBuilder<'_>,
    font: &Handle<Font>,
    label: &str,
    action: SettingsAction,
    marker: M,
) {
    parent
        .spawn((
            Node {
                width: Val::Px(110.0),
                height: Val::Px(36.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgb(0.1, 0.25, 0.12)),
            Button,
            action,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(label),
                TextFont {
                    font: font.clone(),
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                marker,
            ));
        });
}

/// Applies button presses to the active settings and persists every change
/// right away; the settings record is last-write-wins.
pub fn handle_settings_input(
    mut settings: ResMut<ActiveSettings>,
    storage: Res<Storage>,
    mut next_state: ResMut<NextState<GameState>>,
    interaction_query: Query<(&Interaction, &SettingsAction), (Changed<Interaction>, With<Button>)>,
    mut music_text: Query<
        &mut Text,
        (
            With<MusicValueText>,
            Without<EffectsValueText>,
            Without<DifficultyValueText>,
            Without<FactsValueText>,
        ),
    >,
    mut effects_text: Query<
        &mut Text,
        (
            With<EffectsValueText>,
            Without<MusicValueText>,
            Without<DifficultyValueText>,
            Without<FactsValueText>,
        ),
    >,
    mut difficulty_text: Query<
        &mut Text,
        (
            With<DifficultyValueText>,
            Without<MusicValueText>,
            Without<EffectsValueText>,
            Without<FactsValueText>,
        ),
    >,
    mut facts_text: Query<
        &mut Text,
        (
            With<FactsValueText>,
            Without<MusicValueText>,
            Without<EffectsValueText>,
            Without<DifficultyValueText>,
        ),
    >,
) {
    for (interaction, action) in &interaction_query {
        if *interaction != Interaction::Pressed {
            continue;
        }

        match action {
            SettingsAction::MusicDown => {
                settings.0.music_volume = settings.0.music_volume.saturating_sub(1);
            }
            SettingsAction::MusicUp => {
                settings.0.music_volume = (settings.0.music_volume + 1).min(MAX_VOLUME);
            }
            SettingsAction::EffectsDown => {
                settings.0.effects_volume = settings.0.effects_volume.saturating_sub(1);
            }
            SettingsAction::EffectsUp => {
                settings.0.effects_volume = (settings.0.effects_volume + 1).min(MAX_VOLUME);
            }
            SettingsAction::CycleDifficulty => {
                settings.0.difficulty = settings.0.difficulty.next();
            }
            SettingsAction::ToggleFacts => {
                settings.0.show_facts = !settings.0.show_facts;
            }
            SettingsAction::Back => {
                next_state.set(GameState::Welcome);
                return;
            }
        }

        storage.save_settings_logged(&settings.0);

        if let Ok(mut text) = music_text.get_single_mut() {
            *text = Text::new(settings.0.music_volume.to_string());
        }
        if let Ok(mut text) = effects_text.get_single_mut() {
            *text = Text::new(settings.0.effects_volume.to_string());
        }
        if let Ok(mut text) = difficulty_text.get_single_mut() {
            *text = Text::new(settings.0.difficulty.label());
        }
        if let Ok(mut text) = facts_text.get_single_mut() {
            *text = Text::new(facts_label(settings.0.show_facts));
        }
    }
}

pub fn cleanup_settings_screen(
    mut commands: Commands,
    query: Query<Entity, With<SettingsScreenElement>>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
