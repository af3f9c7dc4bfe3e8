use bevy::prelude::*;

use crate::{FONT, WINDOW_HEIGHT, WINDOW_WIDTH};

#[derive(Component)]
pub struct WelcomeScreenElement;

/// Spawns the standard title screen: dark backdrop, title, a short action
/// line and the tap-to-start hint. Screen-specific buttons are spawned by the
/// caller on top of this.
pub fn spawn_welcome_screen(
    commands: &mut Commands,
    asset_server: &Res<AssetServer>,
    title: &str,
    action: &str,
) {
    // Background
    commands.spawn((
        Sprite::from_color(
            Color::srgb(0.03, 0.09, 0.04),
            Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT),
        ),
        WelcomeScreenElement,
    ));

    commands.spawn((
        Text::new(title),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 44.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.85, 0.3)),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(10.0),
            width: Val::Percent(100.0),
            align_items: AlignItems::Center,
            ..default()
        },
        WelcomeScreenElement,
    ));

    commands.spawn((
        Text::new(action),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 24.0,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(26.0),
            width: Val::Percent(100.0),
            align_items: AlignItems::Center,
            ..default()
        },
        WelcomeScreenElement,
    ));

    // "Tap to start" text
    commands.spawn((
        Text::new("Tap to start"),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 30.0,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Percent(20.0),
            width: Val::Percent(100.0),
            align_items: AlignItems::Center,
            ..default()
        },
        WelcomeScreenElement,
    ));
}

pub fn despawn_welcome_screen(
    mut commands: Commands,
    welcome_elements: Query<Entity, With<WelcomeScreenElement>>,
) {
    for entity in welcome_elements.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
