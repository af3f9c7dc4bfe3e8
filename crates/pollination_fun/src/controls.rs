use bevy::prelude::*;
use garden_helpers::input::{
    just_pressed_world_position, just_released_world_position, pressed_world_position,
};
use garden_helpers::{PadDirection, ShellPadInput};
use leafwing_input_manager::prelude::*;

use crate::session::{SessionEntity, SessionState};

// This is the list of "things in the game I want to be able to do based on input"
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum MoveAction {
    Up,
    Down,
    Left,
    Right,
}

pub fn create_input_map() -> InputMap<MoveAction> {
    let mut input_map = InputMap::default();

    input_map.insert(MoveAction::Up, KeyCode::ArrowUp);
    input_map.insert(MoveAction::Up, KeyCode::KeyW);
    input_map.insert(MoveAction::Down, KeyCode::ArrowDown);
    input_map.insert(MoveAction::Down, KeyCode::KeyS);
    input_map.insert(MoveAction::Left, KeyCode::ArrowLeft);
    input_map.insert(MoveAction::Left, KeyCode::KeyA);
    input_map.insert(MoveAction::Right, KeyCode::ArrowRight);
    input_map.insert(MoveAction::Right, KeyCode::KeyD);

    input_map
}

pub fn movement_input_bundle() -> InputManagerBundle<MoveAction> {
    InputManagerBundle::<MoveAction> {
        input_map: create_input_map(),
        ..default()
    }
}

/// The combined movement vector from keyboard, on-screen pad and overlay
/// pad. Each source keeps its own slot so releasing one never cancels
/// another.
#[derive(Resource, Default)]
pub struct MoveIntent {
    keyboard: Vec2,
    pad: Vec2,
    shell_held: [bool; 4],
}

const fn shell_slot(direction: PadDirection) -> usize {
    match direction {
        PadDirection::Up => 0,
        PadDirection::Down => 1,
        PadDirection::Left => 2,
        PadDirection::Right => 3,
    }
}

const SHELL_DIRECTIONS: [PadDirection; 4] = [
    PadDirection::Up,
    PadDirection::Down,
    PadDirection::Left,
    PadDirection::Right,
];

impl MoveIntent {
    /// Unit direction (diagonals included) or zero.
    pub fn direction(&self) -> Vec2 {
        (self.keyboard + self.pad + self.shell_vector()).normalize_or_zero()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set_keyboard(&mut self, direction: Vec2) {
        self.keyboard = direction;
    }

    pub fn set_pad(&mut self, direction: Vec2) {
        self.pad = direction;
    }

    pub fn apply_shell(&mut self, direction: PadDirection, pressed: bool) {
        self.shell_held[shell_slot(direction)] = pressed;
    }

    fn shell_vector(&self) -> Vec2 {
        SHELL_DIRECTIONS
            .iter()
            .filter(|direction| self.shell_held[shell_slot(**direction)])
            .map(|direction| direction.as_vec2())
            .sum()
    }
}

/// Reads the keyboard action state off the bee into the intent.
pub fn read_keyboard(
    query: Query<&ActionState<MoveAction>>,
    mut intent: ResMut<MoveIntent>,
) {
    let Ok(action_state) = query.get_single() else {
        return;
    };

    let mut direction = Vec2::ZERO;
    if action_state.pressed(&MoveAction::Up) {
        direction.y += 1.0;
    }
    if action_state.pressed(&MoveAction::Down) {
        direction.y -= 1.0;
    }
    if action_state.pressed(&MoveAction::Left) {
        direction.x -= 1.0;
    }
    if action_state.pressed(&MoveAction::Right) {
        direction.x += 1.0;
    }
    intent.set_keyboard(direction);
}

/// Drains directional events relayed by the overlay page into the intent.
pub fn read_shell_pad(mut shell_pad: ResMut<ShellPadInput>, mut intent: ResMut<MoveIntent>) {
    for (direction, pressed) in shell_pad.drain() {
        intent.apply_shell(direction, pressed);
    }
}

const PAD_FRAME_RADIUS: f32 = 64.0;
const PAD_LEVER_RADIUS: f32 = 32.0;
const PAD_DEADZONE: f32 = 0.25;
const PAD_COLOR: Color = Color::srgba(0.75, 0.75, 0.75, 0.5);

#[derive(Component, Default)]
pub struct VirtualPadFrame;

#[derive(Component, Default)]
pub struct VirtualPadLever;

pub fn spawn_virtual_pad(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let shape_frame = meshes.add(Annulus::new(
        PAD_FRAME_RADIUS * 0.875,
        PAD_FRAME_RADIUS,
    ));
    let shape_lever = meshes.add(Circle::new(PAD_LEVER_RADIUS));

    commands.spawn((
        Mesh2d(shape_frame),
        MeshMaterial2d(materials.add(PAD_COLOR)),
        Transform::from_xyz(0.0, 0.0, 10.0),
        VirtualPadFrame,
        Visibility::Hidden,
        SessionEntity,
    ));
    commands.spawn((
        Mesh2d(shape_lever),
        MeshMaterial2d(materials.add(PAD_COLOR)),
        Transform::from_xyz(0.0, 0.0, 10.0),
        VirtualPadLever,
        Visibility::Hidden,
        SessionEntity,
    ));
}

/// Floating touch joystick: appears where the press lands, feeds an analog
/// direction into the intent while held.
pub fn update_virtual_pad(
    session: Res<SessionState>,
    window: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut intent: ResMut<MoveIntent>,
    mut frame_query: Query<
        (&mut Transform, &mut Visibility),
        (With<VirtualPadFrame>, Without<VirtualPadLever>),
    >,
    mut lever_query: Query<
        (&mut Transform, &mut Visibility),
        (With<VirtualPadLever>, Without<VirtualPadFrame>),
    >,
) {
    let Ok((mut frame, mut frame_visibility)) = frame_query.get_single_mut() else {
        return;
    };
    let Ok((mut lever, mut lever_visibility)) = lever_query.get_single_mut() else {
        return;
    };

    if !session.input_enabled {
        *frame_visibility = Visibility::Hidden;
        *lever_visibility = Visibility::Hidden;
        intent.set_pad(Vec2::ZERO);
        return;
    }

    if let Some(world_position) =
        just_pressed_world_position(&mouse_button_input, &touch_input, &window, &camera)
    {
        frame.translation.x = world_position.x;
        frame.translation.y = world_position.y;
        *frame_visibility = Visibility::Inherited;
        *lever_visibility = Visibility::Inherited;
    }

    if *frame_visibility == Visibility::Inherited {
        if let Some(world_position) =
            pressed_world_position(&mouse_button_input, &touch_input, &window, &camera)
        {
            let offset = world_position - frame.translation.truncate();
            let limit = PAD_FRAME_RADIUS - PAD_LEVER_RADIUS;
            let clamped = offset.clamp_length_max(limit);
            lever.translation.x = frame.translation.x + clamped.x;
            lever.translation.y = frame.translation.y + clamped.y;

            let strength = clamped.length() / limit;
            if strength < PAD_DEADZONE {
                intent.set_pad(Vec2::ZERO);
            } else {
                intent.set_pad(clamped.normalize_or_zero());
            }
        }
    }

    if just_released_world_position(&mouse_button_input, &touch_input, &window, &camera).is_some()
    {
        *frame_visibility = Visibility::Hidden;
        *lever_visibility = Visibility::Hidden;
        intent.set_pad(Vec2::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_normalizes_diagonals() {
        let mut intent = MoveIntent::default();
        intent.set_keyboard(Vec2::new(1.0, 1.0));
        let direction = intent.direction();
        assert!((direction.length() - 1.0).abs() < 1e-6, "diagonal not unit");
    }

    #[test]
    fn test_sources_compose_and_release_independently() {
        let mut intent = MoveIntent::default();
        intent.set_keyboard(Vec2::X);
        intent.apply_shell(PadDirection::Up, true);
        assert!(intent.direction().x > 0.0);
        assert!(intent.direction().y > 0.0);

        intent.set_keyboard(Vec2::ZERO);
        assert!(intent.direction().x.abs() < f32::EPSILON);
        assert!(intent.direction().y > 0.0, "shell press survives");

        intent.apply_shell(PadDirection::Up, false);
        assert_eq!(intent.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_opposite_shell_directions_cancel() {
        let mut intent = MoveIntent::default();
        intent.apply_shell(PadDirection::Left, true);
        intent.apply_shell(PadDirection::Right, true);
        assert_eq!(intent.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_clear_drops_every_source() {
        let mut intent = MoveIntent::default();
        intent.set_keyboard(Vec2::X);
        intent.set_pad(Vec2::Y);
        intent.apply_shell(PadDirection::Down, true);
        intent.clear();
        assert_eq!(intent.direction(), Vec2::ZERO);
    }
}
