use bevy::prelude::*;
use garden_helpers::{FONT, OverlayMessage, send_overlay_message};

use crate::controls::MoveIntent;
use crate::core::ContactRegime;
use crate::session::{SessionState, set_input_active};

#[derive(Resource, Default)]
pub struct ScoreUI {
    score: u32,
    visibility: Visibility,
    is_dirty: bool,
}

impl ScoreUI {
    pub fn update(&mut self, new_score: u32) {
        self.score = new_score;
        self.is_dirty = true;
    }

    pub fn set_visibility(&mut self, new_visibility: Visibility) {
        self.visibility = new_visibility;
        self.is_dirty = true;
    }
}

#[derive(Resource, Default)]
pub struct TimeUI {
    remaining_secs: u32,
    visibility: Visibility,
    is_dirty: bool,
}

impl TimeUI {
    pub fn update(&mut self, new_remaining_secs: u32) {
        self.remaining_secs = new_remaining_secs;
        self.is_dirty = true;
    }

    pub fn set_visibility(&mut self, new_visibility: Visibility) {
        self.visibility = new_visibility;
        self.is_dirty = true;
    }
}

/// Big center line for round feedback ("Time's up!", quiz results).
#[derive(Resource, Default)]
pub struct CenterTextUI {
    text: String,
    visible: bool,
    is_dirty: bool,
}

impl CenterTextUI {
    pub fn show(&mut self, text: &str) {
        self.text = text.to_string();
        self.visible = true;
        self.is_dirty = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.is_dirty = true;
    }
}

/// The fact / discovery popup. While open, gameplay input and both contact
/// regimes are off; dismissal restores them.
#[derive(Resource, Default)]
pub struct ModalUI {
    text: String,
    open: bool,
    is_dirty: bool,
}

impl ModalUI {
    pub fn show(&mut self, text: String) {
        self.text = text;
        self.open = true;
        self.is_dirty = true;
    }

    pub fn dismiss(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.is_dirty = true;
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }
}

/// Closes the modal and re-arms gameplay in one step. Shared between the
/// in-scene tap handler and the overlay's modal-closed message.
pub fn dismiss_modal(
    modal: &mut ModalUI,
    session: &mut SessionState,
    intent: &mut MoveIntent,
    regime: &mut ContactRegime,
) {
    if !modal.is_open() {
        return;
    }
    modal.dismiss();
    set_input_active(session, intent, true);
    *regime = ContactRegime::Gameplay;
    send_overlay_message(OverlayMessage::ModalClosed);
}

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct TimeText;

#[derive(Component)]
struct CenterText;

#[derive(Component)]
struct ModalRoot;

#[derive(Component)]
struct ModalText;

pub struct GameUiPlugin;

impl Plugin for GameUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScoreUI>()
            .init_resource::<TimeUI>()
            .init_resource::<CenterTextUI>()
            .init_resource::<ModalUI>()
            .add_systems(Startup, setup)
            .add_systems(
                Update,
                (
                    update_score_text,
                    update_time_text,
                    update_center_text,
                    update_modal_display,
                ),
            );
    }
}

fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands
        .spawn(Node {
            width: Val::Percent(100.),
            height: Val::Percent(100.),
            ..Default::default()
        })
        .with_children(|parent| {
            parent.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                Text::new(""),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 24.0,
                    ..default()
                },
                Visibility::Hidden,
                ScoreText,
            ));
            parent.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                Text::new(""),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 24.0,
                    ..default()
                },
                Visibility::Hidden,
                TimeText,
            ));
            parent.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Percent(38.0),
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                Text::new(""),
                TextFont {
                    font: asset_server.load(FONT),
                    font_size: 26.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.4)),
                TextLayout::new_with_justify(JustifyText::Center),
                Visibility::Hidden,
                CenterText,
            ));
        });

    // The fact popup: dark backdrop, panel, dismissal hint.
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            Visibility::Hidden,
            ModalRoot,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        padding: UiRect::all(Val::Px(20.0)),
                        max_width: Val::Percent(85.0),
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.08, 0.18, 0.09, 0.95)),
                ))
                .with_children(|parent| {
                    parent.spawn((
                        Text::new(""),
                        TextFont {
                            font: asset_server.load(FONT),
                            font_size: 22.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        TextLayout::new_with_justify(JustifyText::Center),
                        ModalText,
                    ));
                    parent.spawn((
                        Text::new("Tap to continue"),
                        TextFont {
                            font: asset_server.load(FONT),
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.7, 0.85, 0.7)),
                        Node {
                            margin: UiRect::top(Val::Px(16.0)),
                            ..default()
                        },
                    ));
                });
        });
}

fn update_score_text(
    mut score: ResMut<ScoreUI>,
    mut query: Query<(&mut Text, &mut Visibility), With<ScoreText>>,
) {
    if score.is_dirty {
        for (mut text, mut visibility) in &mut query {
            *text = Text::new(format!("Score: {}", score.score));
            *visibility = score.visibility;
        }
        score.is_dirty = false;
    }
}

fn update_time_text(
    mut time: ResMut<TimeUI>,
    mut query: Query<(&mut Text, &mut Visibility), With<TimeText>>,
) {
    if time.is_dirty {
        for (mut text, mut visibility) in &mut query {
            *text = Text::new(format!("Time: {}", time.remaining_secs));
            *visibility = time.visibility;
        }
        time.is_dirty = false;
    }
}

fn update_center_text(
    mut center_text: ResMut<CenterTextUI>,
    mut query: Query<(&mut Text, &mut Visibility), With<CenterText>>,
) {
    if center_text.is_dirty {
        for (mut text, mut visibility) in &mut query {
            *text = Text::new(center_text.text.clone());
            *visibility = if center_text.visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
        center_text.is_dirty = false;
    }
}

fn update_modal_display(
    mut modal: ResMut<ModalUI>,
    mut root_query: Query<&mut Visibility, With<ModalRoot>>,
    mut text_query: Query<&mut Text, With<ModalText>>,
) {
    if modal.is_dirty {
        for mut visibility in &mut root_query {
            *visibility = if modal.open {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
        for mut text in &mut text_query {
            *text = Text::new(modal.text.clone());
        }
        modal.is_dirty = false;
    }
}

/// Tap anywhere to close the fact popup.
pub fn handle_modal_input(
    mouse_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut modal: ResMut<ModalUI>,
    mut session: ResMut<SessionState>,
    mut intent: ResMut<MoveIntent>,
    mut regime: ResMut<ContactRegime>,
) {
    if !modal.is_open() {
        return;
    }
    if mouse_input.just_pressed(MouseButton::Left) || touch_input.any_just_pressed() {
        dismiss_modal(&mut modal, &mut session, &mut intent, &mut regime);
    }
}
