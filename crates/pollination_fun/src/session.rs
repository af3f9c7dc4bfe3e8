use bevy::prelude::*;
use garden_helpers::floating_score::spawn_floating_score;
use garden_helpers::{
    OverlayMessage, RoundSummary, WINDOW_HEIGHT, WINDOW_WIDTH, send_overlay_message,
};
use rand::prelude::*;
use strum::IntoEnumIterator;
use tracing::warn;

use crate::catalog::{self, FlowerCatalog, FlowerSpecies};
use crate::controls::MoveIntent;
use crate::core::config::{
    BEE_RADIUS, BEE_SPEED, DELIVERY_SCORE, FLOWERS_PER_COLOR, FLOWER_RADIUS, HUD_MARGIN,
    MIN_FLOWER_SPACING, PLACEMENT_ATTEMPTS, TIME_UP_DELAY_SECS, WIN_DELAY_SECS,
};
use crate::core::{
    CollectedEvent, ContactRegime, DeliveredEvent, FlowerColor, GameState, RoundEndedEvent,
};
use crate::game_over::GameOverContext;
use crate::storage::{ActiveSettings, Storage};
use crate::ui::{CenterTextUI, ModalUI, ScoreUI, TimeUI};

/// Index of a flower's record in the [`FlowerArena`]. Sprites carry only
/// this id; all gameplay flags live in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowerId(usize);

/// Gameplay state of one spawned flower.
#[derive(Debug, Clone)]
pub struct FlowerRecord {
    pub species: &'static FlowerSpecies,
    pub color: FlowerColor,
    pub position: Vec2,
    pub has_pollen: bool,
    pub pollinated: bool,
}

/// All flower records of the running round.
#[derive(Resource, Default)]
pub struct FlowerArena {
    flowers: Vec<FlowerRecord>,
}

impl FlowerArena {
    pub fn insert(&mut self, record: FlowerRecord) -> FlowerId {
        self.flowers.push(record);
        FlowerId(self.flowers.len() - 1)
    }

    pub fn get(&self, id: FlowerId) -> Option<&FlowerRecord> {
        self.flowers.get(id.0)
    }

    pub fn get_mut(&mut self, id: FlowerId) -> Option<&mut FlowerRecord> {
        self.flowers.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlowerId, &FlowerRecord)> {
        self.flowers
            .iter()
            .enumerate()
            .map(|(index, record)| (FlowerId(index), record))
    }

    pub fn len(&self) -> usize {
        self.flowers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flowers.is_empty()
    }

    pub fn clear(&mut self) {
        self.flowers.clear();
    }

    /// Is any pollen currently collectible?
    pub fn has_pollen_source(&self) -> bool {
        self.flowers.iter().any(|f| f.has_pollen && !f.pollinated)
    }

    pub fn all_pollinated(&self) -> bool {
        !self.flowers.is_empty() && self.flowers.iter().all(|f| f.pollinated)
    }
}

/// Lifecycle of the playable round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Active,
    Suspended,
    Ended,
}

/// Score, countdown and bee-carrying state of the round.
#[derive(Resource)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub score: u32,
    pub completed_flowers: u32,
    pub remaining_secs: u32,
    pub duration_secs: u32,
    pub input_enabled: bool,
    pub carried_pollen: Option<FlowerColor>,
    countdown: Timer,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(60)
    }
}

impl SessionState {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            phase: SessionPhase::Active,
            score: 0,
            completed_flowers: 0,
            remaining_secs: duration_secs,
            duration_secs,
            input_enabled: true,
            carried_pollen: None,
            countdown: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }

    /// Pauses the countdown without touching the input flag; used by the
    /// bonus challenge, which keeps the bee steerable.
    pub fn suspend(&mut self) {
        if self.phase != SessionPhase::Ended {
            self.phase = SessionPhase::Suspended;
        }
    }

    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Ended {
            self.phase = SessionPhase::Active;
        }
    }

    pub fn end(&mut self) {
        self.phase = SessionPhase::Ended;
        self.input_enabled = false;
    }

    pub const fn elapsed_secs(&self) -> u32 {
        self.duration_secs - self.remaining_secs
    }

    pub const fn summary(&self) -> RoundSummary {
        RoundSummary {
            score: self.score,
            completed_flowers: self.completed_flowers,
            total_time_secs: self.elapsed_secs(),
        }
    }

    /// Advances the 1 Hz countdown while the round is `Active`. Returns how
    /// many whole seconds elapsed this call (usually 0 or 1).
    pub fn tick_countdown(&mut self, delta: core::time::Duration) -> u32 {
        if self.phase != SessionPhase::Active {
            return 0;
        }
        self.countdown.tick(delta);
        let elapsed = self
            .countdown
            .times_finished_this_tick()
            .min(self.remaining_secs);
        self.remaining_secs -= elapsed;
        elapsed
    }
}

/// Toggles movement input. Idempotent; disabling also drops any held
/// movement so resuming never replays stale direction state. The field
/// updates and the overlay notification happen in one uninterrupted step.
pub fn set_input_active(session: &mut SessionState, intent: &mut MoveIntent, active: bool) {
    if session.input_enabled == active {
        return;
    }
    session.input_enabled = active;
    if active {
        session.resume();
    } else {
        session.suspend();
        intent.clear();
    }
    send_overlay_message(OverlayMessage::InputActiveChanged(active));
}

/// Result of one bee/flower contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The bee picked this flower's pollen up.
    Collected { color: FlowerColor },
    /// The bee pollinated this flower.
    Delivered { species: &'static FlowerSpecies },
    Ignored,
}

/// The core interaction rule, one contact at a time:
///
/// - empty bee + pollen-bearing, unpollinated flower → collection;
/// - loaded bee + matching-color, unpollinated, pollen-free flower →
///   delivery;
/// - anything else is a no-op.
///
/// Every branch updates flower flags and the carried color together, so no
/// observer ever sees a half-applied transition.
pub fn resolve_contact(
    arena: &mut FlowerArena,
    carried: &mut Option<FlowerColor>,
    id: FlowerId,
) -> ContactOutcome {
    let Some(flower) = arena.get_mut(id) else {
        return ContactOutcome::Ignored;
    };

    match *carried {
        None => {
            if flower.has_pollen && !flower.pollinated {
                flower.has_pollen = false;
                *carried = Some(flower.color);
                ContactOutcome::Collected {
                    color: flower.color,
                }
            } else {
                ContactOutcome::Ignored
            }
        }
        Some(color) => {
            if flower.color == color && !flower.pollinated && !flower.has_pollen {
                flower.pollinated = true;
                *carried = None;
                ContactOutcome::Delivered {
                    species: flower.species,
                }
            } else {
                ContactOutcome::Ignored
            }
        }
    }
}

/// Grants pollen to one uniformly-random unpollinated flower when nothing is
/// currently collectible, so play never stalls while flowers remain.
pub fn replenish_pollen<R: Rng>(arena: &mut FlowerArena, rng: &mut R) -> Option<FlowerId> {
    if arena.has_pollen_source() {
        return None;
    }
    let id = arena
        .iter()
        .filter(|(_, f)| !f.pollinated && !f.has_pollen)
        .map(|(id, _)| id)
        .choose(rng)?;
    if let Some(flower) = arena.get_mut(id) {
        flower.has_pollen = true;
    }
    Some(id)
}

/// Picks `count` spawn positions with a minimum pairwise spacing by
/// rejection sampling. Once the attempts run out the candidate is placed
/// anyway; a crowded garden beats a missing flower.
pub fn sample_flower_positions<R: Rng>(rng: &mut R, count: usize) -> Vec<Vec2> {
    let x_range = -WINDOW_WIDTH / 2.0 + FLOWER_RADIUS..WINDOW_WIDTH / 2.0 - FLOWER_RADIUS;
    let y_range = -WINDOW_HEIGHT / 2.0 + FLOWER_RADIUS
        ..WINDOW_HEIGHT / 2.0 - HUD_MARGIN - FLOWER_RADIUS;

    let mut positions: Vec<Vec2> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut position;
        let mut attempts = 0;
        loop {
            position = Vec2::new(
                rng.gen_range(x_range.clone()),
                rng.gen_range(y_range.clone()),
            );

            if positions
                .iter()
                .all(|&occupied| occupied.distance(position) >= MIN_FLOWER_SPACING)
            {
                break;
            }

            attempts += 1;
            if attempts >= PLACEMENT_ATTEMPTS {
                warn!("no clear spot after {attempts} attempts, placing flower anyway");
                break;
            }
        }
        positions.push(position);
    }
    positions
}

/// Pollen assignment at spawn: half of `count`, rounded up, as a shuffled
/// mask.
pub fn assign_pollen<R: Rng>(count: usize, rng: &mut R) -> Vec<bool> {
    let sources = count.div_ceil(2);
    let mut mask: Vec<bool> = (0..count).map(|index| index < sources).collect();
    mask.shuffle(rng);
    mask
}

/// Marker for the bee entity.
#[derive(Component)]
pub struct Bee;

/// Small marker dot over the bee, tinted with the carried pollen color.
#[derive(Component)]
pub struct CarriedPollenIndicator;

/// Links a flower sprite back to its arena record.
#[derive(Component)]
pub struct GameplayFlower(pub FlowerId);

/// The pollen dot at a flower's center.
#[derive(Component)]
pub struct PollenIndicator(pub FlowerId);

/// Everything spawned for one round; despawned on every exit path.
#[derive(Component)]
pub struct SessionEntity;

/// Delay between the final delivery (or the countdown hitting zero) and the
/// hand-off to the end-of-round screen.
#[derive(Component)]
pub struct RoundEndDelay {
    timer: Timer,
    win: bool,
}

/// When set, flower sprites render at reduced alpha (bonus challenge owns
/// the screen).
#[derive(Resource, Default)]
pub struct FlowersDimmed(pub bool);

pub fn spawn_session(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    settings: Res<ActiveSettings>,
    mut arena: ResMut<FlowerArena>,
    mut regime: ResMut<ContactRegime>,
    mut dimmed: ResMut<FlowersDimmed>,
    mut score_ui: ResMut<ScoreUI>,
    mut time_ui: ResMut<TimeUI>,
    mut center_text: ResMut<CenterTextUI>,
) {
    let difficulty = settings.0.difficulty;
    let colors: Vec<FlowerColor> = FlowerColor::iter().take(difficulty.color_count()).collect();

    commands.insert_resource(SessionState::new(difficulty.round_secs()));
    *regime = ContactRegime::Gameplay;
    dimmed.0 = false;
    arena.clear();

    let mut rng = rand::thread_rng();
    let positions = sample_flower_positions(&mut rng, colors.len() * FLOWERS_PER_COLOR);
    let mut positions = positions.into_iter();

    for &color in &colors {
        let species_pool = catalog::species_of_color(color);
        let pollen_mask = assign_pollen(FLOWERS_PER_COLOR, &mut rng);

        for has_pollen in pollen_mask {
            let Some(position) = positions.next() else {
                break;
            };
            let Some(&species) = species_pool.as_slice().choose(&mut rng) else {
                // A color without catalog species spawns nothing.
                warn!("no species for color {}", color.name());
                break;
            };
            let id = arena.insert(FlowerRecord {
                species,
                color,
                position,
                has_pollen,
                pollinated: false,
            });

            commands
                .spawn((
                    Mesh2d(meshes.add(Circle::new(FLOWER_RADIUS))),
                    MeshMaterial2d(materials.add(ColorMaterial::from(color.render_color()))),
                    Transform::from_translation(position.extend(0.0)),
                    GameplayFlower(id),
                    SessionEntity,
                ))
                .with_children(|parent| {
                    parent.spawn((
                        Mesh2d(meshes.add(Circle::new(FLOWER_RADIUS * 0.35))),
                        MeshMaterial2d(
                            materials.add(ColorMaterial::from(Color::srgb(1.0, 0.62, 0.1))),
                        ),
                        Transform::from_xyz(0.0, 0.0, 1.0),
                        PollenIndicator(id),
                    ));
                });
        }
    }

    // The bee starts in the clear strip below the flower field.
    commands
        .spawn((
            Mesh2d(meshes.add(Circle::new(BEE_RADIUS))),
            MeshMaterial2d(materials.add(ColorMaterial::from(Color::srgb(0.98, 0.8, 0.15)))),
            Transform::from_xyz(0.0, -WINDOW_HEIGHT / 2.0 + BEE_RADIUS * 2.0, 2.0),
            Bee,
            SessionEntity,
            crate::controls::movement_input_bundle(),
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh2d(meshes.add(Circle::new(BEE_RADIUS * 0.4))),
                MeshMaterial2d(materials.add(ColorMaterial::from(Color::WHITE))),
                Transform::from_xyz(0.0, BEE_RADIUS * 0.9, 1.0),
                Visibility::Hidden,
                CarriedPollenIndicator,
            ));
        });

    score_ui.update(0);
    score_ui.set_visibility(Visibility::Inherited);
    time_ui.update(difficulty.round_secs());
    time_ui.set_visibility(Visibility::Inherited);
    center_text.hide();

    send_overlay_message(OverlayMessage::SessionStarted {
        duration_secs: difficulty.round_secs(),
    });
    send_overlay_message(OverlayMessage::ScoreUpdated(0));
    send_overlay_message(OverlayMessage::TimerUpdated(difficulty.round_secs()));
}

/// Moves the bee from the current input vector. The input flag is checked
/// here, every frame: a timer callback may have flipped it since the frame
/// that observed the change.
pub fn move_bee(
    time: Res<Time>,
    session: Res<SessionState>,
    intent: Res<MoveIntent>,
    mut bee_query: Query<&mut Transform, With<Bee>>,
) {
    if !session.input_enabled {
        return;
    }
    let Ok(mut transform) = bee_query.get_single_mut() else {
        return;
    };

    let direction = intent.direction();
    if direction == Vec2::ZERO {
        return;
    }

    let step = direction * BEE_SPEED * time.delta_secs();
    let target = transform.translation.truncate() + step;
    let clamped = Vec2::new(
        target.x.clamp(
            -WINDOW_WIDTH / 2.0 + BEE_RADIUS,
            WINDOW_WIDTH / 2.0 - BEE_RADIUS,
        ),
        target.y.clamp(
            -WINDOW_HEIGHT / 2.0 + BEE_RADIUS,
            WINDOW_HEIGHT / 2.0 - HUD_MARGIN - BEE_RADIUS,
        ),
    );
    transform.translation = clamped.extend(transform.translation.z);
}

/// Advances the per-second countdown and fires the time's-up path once the
/// last second drains.
pub fn update_countdown(
    mut commands: Commands,
    time: Res<Time>,
    mut session: ResMut<SessionState>,
    mut intent: ResMut<MoveIntent>,
    mut regime: ResMut<ContactRegime>,
    mut time_ui: ResMut<TimeUI>,
    mut center_text: ResMut<CenterTextUI>,
) {
    if session.tick_countdown(time.delta()) == 0 {
        return;
    }

    time_ui.update(session.remaining_secs);
    send_overlay_message(OverlayMessage::TimerUpdated(session.remaining_secs));

    if session.remaining_secs == 0 {
        set_input_active(&mut session, &mut intent, false);
        *regime = ContactRegime::Disabled;
        center_text.show("Time's up!");
        commands.spawn((
            RoundEndDelay {
                timer: Timer::from_seconds(TIME_UP_DELAY_SECS, TimerMode::Once),
                win: false,
            },
            SessionEntity,
        ));
    }
}

/// Evaluates bee/flower overlaps while the gameplay contact regime is armed.
pub fn gameplay_contacts(
    mut commands: Commands,
    mut session: ResMut<SessionState>,
    mut arena: ResMut<FlowerArena>,
    mut catalog: ResMut<FlowerCatalog>,
    mut intent: ResMut<MoveIntent>,
    mut regime: ResMut<ContactRegime>,
    settings: Res<ActiveSettings>,
    storage: Res<Storage>,
    bee_query: Query<&Transform, With<Bee>>,
    mut score_ui: ResMut<ScoreUI>,
    mut center_text: ResMut<CenterTextUI>,
    mut modal: ResMut<ModalUI>,
    mut collected_events: EventWriter<CollectedEvent>,
    mut delivered_events: EventWriter<DeliveredEvent>,
    asset_server: Res<AssetServer>,
) {
    if session.phase != SessionPhase::Active {
        return;
    }
    let Ok(bee_transform) = bee_query.get_single() else {
        return;
    };
    let bee_pos = bee_transform.translation.truncate();

    let touched: Option<FlowerId> = arena
        .iter()
        .find(|(_, flower)| {
            let distance_squared = (flower.position - bee_pos).length_squared();
            let combined = BEE_RADIUS + FLOWER_RADIUS;
            distance_squared <= combined * combined
        })
        .map(|(id, _)| id);

    let Some(id) = touched else {
        return;
    };

    let mut carried = session.carried_pollen;
    let outcome = resolve_contact(&mut arena, &mut carried, id);
    session.carried_pollen = carried;

    match outcome {
        ContactOutcome::Collected { color } => {
            // Collection stays silent: no modal, movement uninterrupted.
            collected_events.send(CollectedEvent {
                color,
                position: bee_pos,
            });
        }
        ContactOutcome::Delivered { species } => {
            session.score += DELIVERY_SCORE;
            session.completed_flowers += 1;
            score_ui.update(session.score);
            send_overlay_message(OverlayMessage::ScoreUpdated(session.score));
            delivered_events.send(DeliveredEvent { position: bee_pos });
            spawn_floating_score(
                &mut commands,
                bee_pos,
                &format!("+{DELIVERY_SCORE}"),
                bevy::color::palettes::css::GREEN,
                &asset_server,
            );

            let mut rng = rand::thread_rng();
            let note = catalog.record_delivery(species, &mut rng);
            storage.save_discovery_logged(&catalog.to_records());

            if arena.all_pollinated() {
                set_input_active(&mut session, &mut intent, false);
                *regime = ContactRegime::Disabled;
                center_text.show("Garden pollinated!");
                commands.spawn((
                    RoundEndDelay {
                        timer: Timer::from_seconds(WIN_DELAY_SECS, TimerMode::Once),
                        win: true,
                    },
                    SessionEntity,
                ));
            } else if settings.0.show_facts {
                let message = note.message();
                send_overlay_message(OverlayMessage::FactRequested(message.clone()));
                modal.show(message);
                set_input_active(&mut session, &mut intent, false);
                *regime = ContactRegime::Disabled;
            }
        }
        ContactOutcome::Ignored => {}
    }

    // The replenishment rule runs after every contact evaluation, matching
    // the delivery check it follows.
    let mut rng = rand::thread_rng();
    replenish_pollen(&mut arena, &mut rng);
}

/// Mirrors arena flags onto sprites: pollen dots, pollinated tint, the
/// challenge dim, and the bee's carried-pollen marker.
pub fn sync_flower_visuals(
    arena: Res<FlowerArena>,
    session: Res<SessionState>,
    dimmed: Res<FlowersDimmed>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut pollen_query: Query<(&PollenIndicator, &mut Visibility), Without<CarriedPollenIndicator>>,
    flower_query: Query<(&GameplayFlower, &MeshMaterial2d<ColorMaterial>)>,
    mut carried_query: Query<
        (&mut Visibility, &MeshMaterial2d<ColorMaterial>),
        With<CarriedPollenIndicator>,
    >,
) {
    for (indicator, mut visibility) in &mut pollen_query {
        let visible = arena
            .get(indicator.0)
            .is_some_and(|flower| flower.has_pollen && !flower.pollinated);
        *visibility = if visible && !dimmed.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    for (flower, material_handle) in &flower_query {
        let Some(record) = arena.get(flower.0) else {
            continue;
        };
        let Some(material) = materials.get_mut(&material_handle.0) else {
            continue;
        };
        let mut color = record.color.render_color();
        if record.pollinated {
            // Washed-out tint marks a finished flower.
            let base = color.to_srgba();
            color = Color::srgb(
                0.45f32.mul_add(1.0 - base.red, base.red),
                0.45f32.mul_add(1.0 - base.green, base.green),
                0.45f32.mul_add(1.0 - base.blue, base.blue),
            );
        }
        material.color = color.with_alpha(if dimmed.0 { 0.35 } else { 1.0 });
    }

    if let Ok((mut visibility, material_handle)) = carried_query.get_single_mut() {
        match session.carried_pollen {
            Some(color) => {
                *visibility = Visibility::Inherited;
                if let Some(material) = materials.get_mut(&material_handle.0) {
                    material.color = color.render_color();
                }
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

/// Runs the short end-of-round delay, then hands the summary off to the
/// end screen.
pub fn finish_round(
    mut commands: Commands,
    time: Res<Time>,
    mut session: ResMut<SessionState>,
    mut delay_query: Query<(Entity, &mut RoundEndDelay)>,
    mut round_ended: EventWriter<RoundEndedEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Ok((entity, mut delay)) = delay_query.get_single_mut() else {
        return;
    };
    delay.timer.tick(time.delta());
    if !delay.timer.just_finished() {
        return;
    }

    session.end();
    let summary = session.summary();
    commands.entity(entity).despawn();
    commands.insert_resource(GameOverContext {
        summary,
        win: delay.win,
        record_score: true,
    });
    round_ended.send(RoundEndedEvent {
        summary,
        win: delay.win,
    });
    send_overlay_message(OverlayMessage::SessionEnded(summary));
    next_state.set(GameState::GameOver);
}

/// Tears one round down. Runs on every exit path from `Playing`, normal or
/// forced, so no timer survives into the next screen.
pub fn cleanup_session(
    mut commands: Commands,
    entities: Query<Entity, With<SessionEntity>>,
    mut arena: ResMut<FlowerArena>,
    mut regime: ResMut<ContactRegime>,
    mut dimmed: ResMut<FlowersDimmed>,
    mut intent: ResMut<MoveIntent>,
    mut score_ui: ResMut<ScoreUI>,
    mut time_ui: ResMut<TimeUI>,
    mut center_text: ResMut<CenterTextUI>,
    mut modal: ResMut<ModalUI>,
) {
    for entity in &entities {
        commands.entity(entity).despawn_recursive();
    }
    arena.clear();
    intent.clear();
    *regime = ContactRegime::Gameplay;
    dimmed.0 = false;
    score_ui.set_visibility(Visibility::Hidden);
    time_ui.set_visibility(Visibility::Hidden);
    center_text.hide();
    modal.dismiss();
    commands.insert_resource(SessionState::default());
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn arena_with(colors: &[(FlowerColor, bool)]) -> FlowerArena {
        let mut arena = FlowerArena::default();
        for (index, &(color, has_pollen)) in colors.iter().enumerate() {
            let species = catalog::species_of_color(color)[0];
            arena.insert(FlowerRecord {
                species,
                color,
                position: Vec2::new(index as f32 * 100.0, 0.0),
                has_pollen,
                pollinated: false,
            });
        }
        arena
    }

    fn assert_invariant(arena: &FlowerArena) {
        for (_, flower) in arena.iter() {
            assert!(
                !(flower.pollinated && flower.has_pollen),
                "pollinated flower still offers pollen"
            );
        }
    }

    #[test]
    fn test_collect_then_deliver_scores_once() {
        // Two red (one with pollen), two blue (one with pollen).
        let mut arena = arena_with(&[
            (FlowerColor::Red, true),
            (FlowerColor::Red, false),
            (FlowerColor::Blue, true),
            (FlowerColor::Blue, false),
        ]);
        let mut carried = None;

        let outcome = resolve_contact(&mut arena, &mut carried, FlowerId(0));
        assert_eq!(
            outcome,
            ContactOutcome::Collected {
                color: FlowerColor::Red
            }
        );
        assert_eq!(carried, Some(FlowerColor::Red));
        assert!(!arena.get(FlowerId(0)).expect("flower").has_pollen);
        assert_invariant(&arena);

        let outcome = resolve_contact(&mut arena, &mut carried, FlowerId(1));
        assert!(matches!(outcome, ContactOutcome::Delivered { .. }));
        assert_eq!(carried, None);
        assert!(arena.get(FlowerId(1)).expect("flower").pollinated);
        assert_invariant(&arena);
    }

    #[test]
    fn test_mismatched_color_is_a_no_op() {
        let mut arena = arena_with(&[(FlowerColor::Red, true), (FlowerColor::Blue, true)]);
        let mut carried = None;

        resolve_contact(&mut arena, &mut carried, FlowerId(0));
        assert_eq!(carried, Some(FlowerColor::Red));

        // Touching a blue flower with red pollen changes nothing, including
        // the blue flower's own pollen.
        let outcome = resolve_contact(&mut arena, &mut carried, FlowerId(1));
        assert_eq!(outcome, ContactOutcome::Ignored);
        assert_eq!(carried, Some(FlowerColor::Red), "bee keeps its load");
        let blue = arena.get(FlowerId(1)).expect("flower");
        assert!(blue.has_pollen && !blue.pollinated);
        assert_invariant(&arena);
    }

    #[test]
    fn test_loaded_bee_cannot_collect_more() {
        let mut arena = arena_with(&[(FlowerColor::Red, true), (FlowerColor::Red, true)]);
        let mut carried = None;

        resolve_contact(&mut arena, &mut carried, FlowerId(0));
        let outcome = resolve_contact(&mut arena, &mut carried, FlowerId(1));
        // The second red flower still has pollen, so delivery is refused and
        // no second collection happens.
        assert_eq!(outcome, ContactOutcome::Ignored);
        assert_eq!(carried, Some(FlowerColor::Red));
        assert!(arena.get(FlowerId(1)).expect("flower").has_pollen);
    }

    #[test]
    fn test_delivery_requires_pollen_free_target() {
        let mut arena = arena_with(&[(FlowerColor::Red, false), (FlowerColor::Red, true)]);
        let mut carried = Some(FlowerColor::Red);

        let outcome = resolve_contact(&mut arena, &mut carried, FlowerId(1));
        assert_eq!(outcome, ContactOutcome::Ignored);

        let outcome = resolve_contact(&mut arena, &mut carried, FlowerId(0));
        assert!(matches!(outcome, ContactOutcome::Delivered { .. }));
    }

    #[test]
    fn test_pollinated_flower_is_never_a_source() {
        let mut arena = arena_with(&[(FlowerColor::Red, true), (FlowerColor::Red, false)]);
        let mut carried = None;
        resolve_contact(&mut arena, &mut carried, FlowerId(0));
        resolve_contact(&mut arena, &mut carried, FlowerId(1));
        assert!(arena.get(FlowerId(1)).expect("flower").pollinated);

        // A fresh bee touching the pollinated flower collects nothing.
        let outcome = resolve_contact(&mut arena, &mut carried, FlowerId(1));
        assert_eq!(outcome, ContactOutcome::Ignored);
        assert_eq!(carried, None);
        assert_invariant(&arena);
    }

    #[test]
    fn test_replenishment_grants_exactly_one() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut arena = arena_with(&[
            (FlowerColor::Red, true),
            (FlowerColor::Red, false),
            (FlowerColor::Red, false),
        ]);
        let mut carried = None;
        resolve_contact(&mut arena, &mut carried, FlowerId(0));
        resolve_contact(&mut arena, &mut carried, FlowerId(1));

        // No pollen anywhere, two unpollinated flowers left.
        assert!(!arena.has_pollen_source());
        let granted = replenish_pollen(&mut arena, &mut rng);
        assert!(granted.is_some(), "replenishment must trigger");
        let sources = arena
            .iter()
            .filter(|(_, f)| f.has_pollen && !f.pollinated)
            .count();
        assert_eq!(sources, 1, "exactly one flower regains pollen");
        assert_invariant(&arena);

        // With a source available the rule is a no-op.
        assert_eq!(replenish_pollen(&mut arena, &mut rng), None);
    }

    #[test]
    fn test_replenishment_skips_finished_garden() {
        let mut arena = arena_with(&[(FlowerColor::Red, true), (FlowerColor::Red, false)]);
        let mut carried = None;
        resolve_contact(&mut arena, &mut carried, FlowerId(0));
        resolve_contact(&mut arena, &mut carried, FlowerId(1));
        arena.get_mut(FlowerId(0)).expect("flower").pollinated = true;
        arena.get_mut(FlowerId(0)).expect("flower").has_pollen = false;

        let mut rng = StdRng::seed_from_u64(7);
        assert!(arena.all_pollinated());
        assert_eq!(replenish_pollen(&mut arena, &mut rng), None);
    }

    #[test]
    fn test_pollen_assignment_rounds_up() {
        let mut rng = StdRng::seed_from_u64(7);
        let mask = assign_pollen(5, &mut rng);
        assert_eq!(mask.iter().filter(|&&p| p).count(), 3);
        let mask = assign_pollen(4, &mut rng);
        assert_eq!(mask.iter().filter(|&&p| p).count(), 2);
    }

    #[test]
    fn test_placement_respects_spacing_when_room_allows() {
        let mut rng = StdRng::seed_from_u64(42);
        let positions = sample_flower_positions(&mut rng, 8);
        assert_eq!(positions.len(), 8, "every flower gets a spot");
        for (i, a) in positions.iter().enumerate() {
            for b in positions.iter().skip(i + 1) {
                assert!(
                    a.distance(*b) >= MIN_FLOWER_SPACING,
                    "eight flowers fit the window without fallback"
                );
            }
        }
    }

    #[test]
    fn test_overcrowded_placement_still_places_all() {
        let mut rng = StdRng::seed_from_u64(42);
        // Far more flowers than the spacing rule can satisfy.
        let positions = sample_flower_positions(&mut rng, 60);
        assert_eq!(positions.len(), 60, "placement degrades, never fails");
    }

    #[test]
    fn test_countdown_only_runs_while_active() {
        let mut session = SessionState::new(60);
        assert_eq!(session.tick_countdown(Duration::from_secs(1)), 1);
        assert_eq!(session.remaining_secs, 59);

        session.suspend();
        assert_eq!(session.tick_countdown(Duration::from_secs(5)), 0);
        assert_eq!(session.remaining_secs, 59, "suspension pauses the clock");

        session.resume();
        assert_eq!(session.tick_countdown(Duration::from_secs(2)), 2);
        assert_eq!(session.remaining_secs, 57);
    }

    #[test]
    fn test_countdown_saturates_at_zero() {
        let mut session = SessionState::new(2);
        session.tick_countdown(Duration::from_secs(10));
        assert_eq!(session.remaining_secs, 0);
        assert_eq!(session.elapsed_secs(), 2);
    }

    #[test]
    fn test_ended_is_terminal() {
        let mut session = SessionState::new(60);
        session.end();
        session.resume();
        assert_eq!(session.phase, SessionPhase::Ended, "resume cannot revive");
        assert!(!session.input_enabled);
        assert_eq!(session.tick_countdown(Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_set_input_active_is_idempotent_and_clears_intent() {
        let mut session = SessionState::new(60);
        let mut intent = MoveIntent::default();
        intent.set_keyboard(Vec2::new(1.0, 0.0));
        assert_ne!(intent.direction(), Vec2::ZERO);

        set_input_active(&mut session, &mut intent, false);
        assert!(!session.input_enabled);
        assert_eq!(session.phase, SessionPhase::Suspended);
        assert_eq!(intent.direction(), Vec2::ZERO, "held input dropped");

        // Disabling again changes nothing.
        set_input_active(&mut session, &mut intent, false);
        assert!(!session.input_enabled);

        set_input_active(&mut session, &mut intent, true);
        assert!(session.input_enabled);
        assert_eq!(session.phase, SessionPhase::Active);
    }

    #[test]
    fn test_summary_reports_elapsed_time() {
        let mut session = SessionState::new(60);
        for _ in 0..60 {
            session.tick_countdown(Duration::from_secs(1));
        }
        session.completed_flowers = 1;
        session.score = 10;
        let summary = session.summary();
        assert_eq!(summary.total_time_secs, 60);
        assert_eq!(summary.completed_flowers, 1);
        assert_eq!(summary.score, 10);
    }
}
