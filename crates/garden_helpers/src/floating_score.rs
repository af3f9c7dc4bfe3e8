use core::time::Duration;

use bevy::prelude::*;

use crate::FONT;

#[derive(Component)]
pub struct FloatingScore {
    timer: Timer,
    start: Vec2,
}

/// Spawns a short-lived world-space text popup ("+10", "Discovered!") that
/// rises and shrinks away over one second.
pub fn spawn_floating_score(
    commands: &mut Commands,
    position: Vec2,
    text: &str,
    color: Srgba,
    asset_server: &Res<AssetServer>,
) {
    commands.spawn((
        Text2d::new(text),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 24.0,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        Transform::from_xyz(position.x, position.y, 5.0),
        FloatingScore {
            timer: Timer::new(Duration::from_secs(1), TimerMode::Once),
            start: position,
        },
    ));
}

pub fn animate_floating_scores(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut FloatingScore)>,
) {
    for (entity, mut transform, mut floating_score) in &mut query {
        floating_score.timer.tick(time.delta());
        let progress = floating_score.timer.fraction();

        // Move upwards and fade out
        transform.translation.y = 50.0f32.mul_add(progress, floating_score.start.y);
        transform.scale = Vec3::splat(1.0 - progress);

        if floating_score.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
