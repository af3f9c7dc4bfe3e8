use bevy::prelude::*;
use garden_helpers::{FONT, WINDOW_HEIGHT, WINDOW_WIDTH};

use crate::catalog::{FlowerCatalog, SPECIES};
use crate::core::GameState;

#[derive(Component)]
pub struct CollectionScreenElement;

#[derive(Component)]
pub struct CollectionBackButton;

pub fn spawn_collection_screen(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    catalog: Res<FlowerCatalog>,
) {
    commands.spawn((
        Sprite::from_color(
            Color::srgb(0.03, 0.09, 0.04),
            Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT),
        ),
        CollectionScreenElement,
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
                row_gap: Val::Px(8.0),
                padding: UiRect::top(Val::Px(40.0)),
                ..default()
            },
            CollectionScreenElement,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(format!(
                    "Flower Collection  {}/{}",
                    catalog.discovered_count(),
                    SPECIES.len()
                )),
                text_font(28.0),
                TextColor(Color::WHITE),
            ));

            for species in SPECIES {
                let discovered = catalog.is_discovered(species.id);
                let (name_line, detail_line) = if discovered {
                    (
                        format!("{}  x{}", species.name, catalog.count(species.id)),
                        format!(
                            "{} - {} - {}",
                            species.scientific_name,
                            species.family,
                            species.regions.join(", ")
                        ),
                    )
                } else {
                    ("???".to_string(), "Pollinate one to discover it".to_string())
                };

                parent
                    .spawn(Node {
                        width: Val::Percent(88.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(6.0)),
                        ..default()
                    })
                    .insert(BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.06)))
                    .with_children(|parent| {
                        parent.spawn((
                            Text::new(name_line),
                            text_font(18.0),
                            TextColor(if discovered {
                                species.color.render_color()
                            } else {
                                Color::srgb(0.6, 0.6, 0.6)
                            }),
                        ));
                        parent.spawn((
                            Text::new(detail_line),
                            text_font(13.0),
                            TextColor(Color::srgb(0.75, 0.8, 0.75)),
                        ));
                    });
            }

            parent
                .spawn((
                    Node {
                        width: Val::Px(140.0),
                        height: Val::Px(44.0),
                        margin: UiRect::top(Val::Px(14.0)),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.1, 0.25, 0.12)),
                    Button,
                    CollectionBackButton,
                ))
                .with_children(|parent| {
                    parent.spawn((Text::new("Back"), text_font(22.0), TextColor(Color::WHITE)));
                });
        });
}

pub fn handle_collection_input(
    mut next_state: ResMut<NextState<GameState>>,
    mut interaction_query: Query<
        &Interaction,
        (Changed<Interaction>, With<CollectionBackButton>),
    >,
) {
    for interaction in &mut interaction_query {
        if *interaction == Interaction::Pressed {
            next_state.set(GameState::Welcome);
        }
    }
}

pub fn cleanup_collection_screen(
    mut commands: Commands,
    query: Query<Entity, With<CollectionScreenElement>>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
