use bevy::prelude::*;
use garden_helpers::FONT;
use garden_helpers::welcome_screen::{WelcomeScreenElement, spawn_welcome_screen};

use crate::core::GameState;

/// Secondary screens reachable from the title.
#[derive(Component, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Settings,
    Collection,
}

pub fn spawn_title_screen(mut commands: Commands, asset_server: Res<AssetServer>) {
    spawn_welcome_screen(
        &mut commands,
        &asset_server,
        "Pollination Fun!",
        "Carry pollen between flowers\nof the same color!",
    );

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Percent(6.0),
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                column_gap: Val::Px(14.0),
                ..default()
            },
            WelcomeScreenElement,
        ))
        .with_children(|parent| {
            for (label, button) in [
                ("Settings", MenuButton::Settings),
                ("Collection", MenuButton::Collection),
            ] {
                parent
                    .spawn((
                        Node {
                            width: Val::Px(130.0),
                            height: Val::Px(44.0),
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
                            TextFont {
                                font: asset_server.load(FONT),
                                font_size: 22.0,
                                ..default()
                            },
                            TextColor(Color::WHITE),
                        ));
                    });
            }
        });
}

/// Tap anywhere (outside the menu buttons) to start a round; the buttons
/// lead to the settings and collection screens.
pub fn handle_title_input(
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut next_state: ResMut<NextState<GameState>>,
    interaction_query: Query<(&Interaction, &MenuButton), With<Button>>,
) {
    for (interaction, button) in &interaction_query {
        if *interaction == Interaction::Pressed {
            next_state.set(match button {
                MenuButton::Settings => GameState::Settings,
                MenuButton::Collection => GameState::Collection,
            });
            return;
        }
    }

    // A press on or near a button must not double as "start playing".
    if interaction_query
        .iter()
        .any(|(interaction, _)| *interaction != Interaction::None)
    {
        return;
    }

    if mouse_button_input.just_pressed(MouseButton::Left) || touch_input.any_just_pressed() {
        next_state.set(GameState::Playing);
    }
}
