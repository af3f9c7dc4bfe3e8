use std::f32::consts::PI;

use bevy::prelude::*;
use garden_helpers::floating_score::spawn_floating_score;
use garden_helpers::{FONT, OverlayMessage, WINDOW_HEIGHT, send_overlay_message};
use tracing::warn;

use crate::core::config::{
    ANSWER_FLOWER_RADIUS, BEE_RADIUS, BONUS_ANSWER_SCORE, BONUS_ANSWER_SECS, BONUS_GRACE_SECS,
    BONUS_MAX_DELAY_SECS, BONUS_MIN_DELAY_SECS, BONUS_RESULT_SECS,
};
use crate::core::{BonusResolvedEvent, ContactRegime};
use crate::quiz::{QuizBank, QuizQuestion};
use crate::session::{Bee, FlowersDimmed, SessionEntity, SessionPhase, SessionState};
use crate::ui::{CenterTextUI, ScoreUI};

/// Phase of the trivia interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BonusPhase {
    /// Waiting out the randomized delay until the next challenge.
    #[default]
    Idle,
    /// Question and answers are on screen, touches not yet armed.
    Preparing,
    /// Bee-versus-answer overlap is live, deadline running.
    AwaitingAnswer,
    /// Feedback shown, waiting out the dwell before cleanup.
    Resolved,
}

/// The single bonus-challenge slot of a session.
#[derive(Resource)]
pub struct BonusChallenge {
    phase: BonusPhase,
    delay: Timer,
    grace: Timer,
    deadline: Timer,
    dwell: Timer,
    question: Option<&'static QuizQuestion>,
}

impl Default for BonusChallenge {
    fn default() -> Self {
        let mut challenge = Self {
            phase: BonusPhase::Idle,
            delay: Timer::default(),
            grace: Timer::default(),
            deadline: Timer::default(),
            dwell: Timer::default(),
            question: None,
        };
        challenge.schedule_next();
        challenge
    }
}

impl BonusChallenge {
    /// Arms the one-shot delay with a uniform draw from the configured
    /// bounds and returns to `Idle`.
    pub fn schedule_next(&mut self) {
        let secs = BONUS_MIN_DELAY_SECS
            + fastrand::f32() * (BONUS_MAX_DELAY_SECS - BONUS_MIN_DELAY_SECS);
        self.delay = Timer::from_seconds(secs, TimerMode::Once);
        self.phase = BonusPhase::Idle;
        self.question = None;
    }

    pub const fn phase(&self) -> BonusPhase {
        self.phase
    }

    pub const fn is_active(&self) -> bool {
        !matches!(self.phase, BonusPhase::Idle)
    }

    pub const fn question(&self) -> Option<&'static QuizQuestion> {
        self.question
    }

    pub fn scheduled_delay_secs(&self) -> f32 {
        self.delay.duration().as_secs_f32()
    }

    /// Starts a challenge with `question`. No-op when one is already
    /// running.
    pub fn begin(&mut self, question: &'static QuizQuestion) -> bool {
        if self.is_active() {
            return false;
        }
        self.question = Some(question);
        self.grace = Timer::from_seconds(BONUS_GRACE_SECS, TimerMode::Once);
        self.phase = BonusPhase::Preparing;
        true
    }

    /// Ends the grace window: answers become touchable and the deadline
    /// starts.
    pub fn arm_answers(&mut self) {
        if self.phase == BonusPhase::Preparing {
            self.deadline = Timer::from_seconds(BONUS_ANSWER_SECS, TimerMode::Once);
            self.phase = BonusPhase::AwaitingAnswer;
        }
    }

    /// Locks further answers in. Only effective while answers are armed;
    /// the first resolution wins.
    pub fn resolve(&mut self) -> bool {
        if self.phase != BonusPhase::AwaitingAnswer {
            return false;
        }
        self.dwell = Timer::from_seconds(BONUS_RESULT_SECS, TimerMode::Once);
        self.phase = BonusPhase::Resolved;
        true
    }

    /// Closes the challenge and schedules the next one. Safe to call twice:
    /// the second call finds `Idle` and does nothing, so neither the next
    /// delay nor the input restore runs twice.
    pub fn finalize(&mut self) -> bool {
        if self.phase == BonusPhase::Idle {
            return false;
        }
        self.schedule_next();
        true
    }
}

/// One touchable answer entity of the running challenge.
#[derive(Component)]
pub struct AnswerFlower {
    pub option_index: usize,
    pub correct: bool,
}

/// Everything spawned for one challenge (question text, answers).
#[derive(Component)]
pub struct BonusUiElement;

/// World positions for `count` answer flowers: a left/right pair for two
/// answers, a semicircle fanned below the question for more.
pub fn answer_layout(count: usize) -> Vec<Vec2> {
    const PAIR_OFFSET: f32 = 90.0;
    const FAN_RADIUS: f32 = 130.0;
    const CENTER_Y: f32 = -40.0;

    match count {
        0 => Vec::new(),
        1 => vec![Vec2::new(0.0, CENTER_Y)],
        2 => vec![
            Vec2::new(-PAIR_OFFSET, CENTER_Y),
            Vec2::new(PAIR_OFFSET, CENTER_Y),
        ],
        n => (0..n)
            .map(|index| {
                // Fan across the lower half circle, left to right.
                let t = index as f32 / (n - 1) as f32;
                let angle = PI - t * PI;
                Vec2::new(
                    angle.cos() * FAN_RADIUS,
                    CENTER_Y + angle.sin() * -FAN_RADIUS * 0.6,
                )
            })
            .collect(),
    }
}

/// Counts down the randomized delay and opens the challenge when it fires.
/// The delay only runs while normal gameplay owns the screen.
pub fn schedule_bonus(
    mut commands: Commands,
    time: Res<Time>,
    mut bonus: ResMut<BonusChallenge>,
    mut quiz_bank: ResMut<QuizBank>,
    mut session: ResMut<SessionState>,
    mut regime: ResMut<ContactRegime>,
    mut dimmed: ResMut<FlowersDimmed>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    asset_server: Res<AssetServer>,
) {
    if bonus.is_active()
        || *regime != ContactRegime::Gameplay
        || session.phase != SessionPhase::Active
    {
        return;
    }

    bonus.delay.tick(time.delta());
    if !bonus.delay.just_finished() {
        return;
    }

    let mut rng = rand::thread_rng();
    let Some(question) = quiz_bank.draw(&mut rng) else {
        // An empty bank is not fatal; quiz time simply never comes.
        warn!("no quiz questions available, skipping bonus challenge");
        bonus.schedule_next();
        return;
    };

    if !bonus.begin(question) {
        return;
    }

    // The countdown pauses but the bee stays steerable; gameplay flowers
    // keep their state and only fade back.
    session.suspend();
    *regime = ContactRegime::Challenge;
    dimmed.0 = true;

    commands.spawn((
        Text2d::new(format!("Quiz time!\n{}", question.prompt)),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 26.0,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Transform::from_xyz(0.0, WINDOW_HEIGHT / 4.0, 6.0),
        BonusUiElement,
        SessionEntity,
    ));

    let positions = answer_layout(question.option_count());
    for (index, position) in positions.into_iter().enumerate() {
        commands
            .spawn((
                Mesh2d(meshes.add(Circle::new(ANSWER_FLOWER_RADIUS))),
                MeshMaterial2d(materials.add(ColorMaterial::from(Color::srgb(0.95, 0.5, 0.75)))),
                Transform::from_translation(position.extend(5.0)),
                AnswerFlower {
                    option_index: index,
                    correct: question.is_correct(index),
                },
                BonusUiElement,
                SessionEntity,
            ))
            .with_children(|parent| {
                parent.spawn((
                    Text2d::new(question.option_label(index)),
                    TextFont {
                        font: asset_server.load(FONT),
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(Color::BLACK),
                    TextLayout::new_with_justify(JustifyText::Center),
                    Transform::from_xyz(0.0, 0.0, 1.0),
                ));
            });
    }
}

/// Waits out the grace window so the player cannot answer by accident
/// before reading the question.
pub fn prepare_bonus(time: Res<Time>, mut bonus: ResMut<BonusChallenge>) {
    if bonus.phase() != BonusPhase::Preparing {
        return;
    }
    bonus.grace.tick(time.delta());
    if bonus.grace.just_finished() {
        bonus.arm_answers();
    }
}

/// Bee-versus-answer overlap, live only while answers are armed.
pub fn bonus_answer_contacts(
    mut commands: Commands,
    mut bonus: ResMut<BonusChallenge>,
    mut quiz_bank: ResMut<QuizBank>,
    mut session: ResMut<SessionState>,
    mut score_ui: ResMut<ScoreUI>,
    mut center_text: ResMut<CenterTextUI>,
    bee_query: Query<&Transform, With<Bee>>,
    answer_query: Query<(&Transform, &AnswerFlower), Without<Bee>>,
    mut resolved_events: EventWriter<BonusResolvedEvent>,
    asset_server: Res<AssetServer>,
) {
    if bonus.phase() != BonusPhase::AwaitingAnswer {
        return;
    }
    let Ok(bee_transform) = bee_query.get_single() else {
        return;
    };
    let bee_pos = bee_transform.translation.truncate();

    let touched = answer_query.iter().find(|(transform, _)| {
        let distance_squared = (transform.translation.truncate() - bee_pos).length_squared();
        let combined = BEE_RADIUS + ANSWER_FLOWER_RADIUS;
        distance_squared <= combined * combined
    });

    let Some((answer_transform, answer)) = touched else {
        return;
    };
    if !bonus.resolve() {
        return;
    }

    let Some(question) = bonus.question() else {
        return;
    };
    quiz_bank.record_result(question.id, answer.correct);

    if answer.correct {
        session.score += BONUS_ANSWER_SCORE;
        score_ui.update(session.score);
        send_overlay_message(OverlayMessage::ScoreUpdated(session.score));
        spawn_floating_score(
            &mut commands,
            answer_transform.translation.truncate(),
            &format!("+{BONUS_ANSWER_SCORE}"),
            bevy::color::palettes::css::GREEN,
            &asset_server,
        );
        center_text.show(&format!("Correct!\n\n{}", question.explanation));
    } else {
        center_text.show(&format!("Not quite.\n\n{}", question.explanation));
    }

    resolved_events.send(BonusResolvedEvent {
        correct: Some(answer.correct),
    });
}

/// Forces an unanswered challenge into `Resolved` with a neutral message.
pub fn bonus_timeout(
    time: Res<Time>,
    mut bonus: ResMut<BonusChallenge>,
    mut quiz_bank: ResMut<QuizBank>,
    mut center_text: ResMut<CenterTextUI>,
    mut resolved_events: EventWriter<BonusResolvedEvent>,
) {
    if bonus.phase() != BonusPhase::AwaitingAnswer {
        return;
    }
    bonus.deadline.tick(time.delta());
    if !bonus.deadline.just_finished() {
        return;
    }
    if !bonus.resolve() {
        return;
    }

    if let Some(question) = bonus.question() {
        quiz_bank.record_result(question.id, false);
    }
    center_text.show("Time's up!");
    resolved_events.send(BonusResolvedEvent { correct: None });
}

/// Waits out the feedback dwell, then restores normal gameplay: answers
/// despawned, flowers undimmed, countdown resumed, next challenge armed.
pub fn bonus_cleanup(
    mut commands: Commands,
    time: Res<Time>,
    mut bonus: ResMut<BonusChallenge>,
    mut session: ResMut<SessionState>,
    mut regime: ResMut<ContactRegime>,
    mut dimmed: ResMut<FlowersDimmed>,
    mut center_text: ResMut<CenterTextUI>,
    elements: Query<Entity, With<BonusUiElement>>,
) {
    if bonus.phase() != BonusPhase::Resolved {
        return;
    }
    bonus.dwell.tick(time.delta());
    if !bonus.dwell.just_finished() {
        return;
    }
    if !bonus.finalize() {
        return;
    }

    for entity in &elements {
        commands.entity(entity).despawn_recursive();
    }
    dimmed.0 = false;
    center_text.hide();
    *regime = ContactRegime::Gameplay;
    session.resume();
}

/// Fresh challenge slot for the next round; part of session teardown.
pub fn reset_bonus(mut commands: Commands) {
    commands.insert_resource(BonusChallenge::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{QUESTIONS, QuestionBody, QuizQuestion};

    static QUESTION: QuizQuestion = QuizQuestion {
        id: "test",
        prompt: "test",
        body: QuestionBody::TrueFalse { answer: true },
        explanation: "because",
        category: "test",
    };

    #[test]
    fn test_scheduled_delay_within_bounds() {
        for _ in 0..50 {
            let challenge = BonusChallenge::default();
            let secs = challenge.scheduled_delay_secs();
            assert!(
                (BONUS_MIN_DELAY_SECS..=BONUS_MAX_DELAY_SECS).contains(&secs),
                "delay {secs} outside configured bounds"
            );
        }
    }

    #[test]
    fn test_begin_is_a_no_op_while_active() {
        let mut challenge = BonusChallenge::default();
        assert!(challenge.begin(&QUESTION));
        assert_eq!(challenge.phase(), BonusPhase::Preparing);
        assert!(!challenge.begin(&QUESTIONS[0]), "second begin refused");
        assert_eq!(challenge.question().map(|q| q.id), Some("test"));
    }

    #[test]
    fn test_answers_ignored_during_grace_window() {
        let mut challenge = BonusChallenge::default();
        challenge.begin(&QUESTION);
        assert!(
            !challenge.resolve(),
            "touch during the grace window must not resolve"
        );
        challenge.arm_answers();
        assert_eq!(challenge.phase(), BonusPhase::AwaitingAnswer);
        assert!(challenge.resolve());
    }

    #[test]
    fn test_first_resolution_wins() {
        let mut challenge = BonusChallenge::default();
        challenge.begin(&QUESTION);
        challenge.arm_answers();
        assert!(challenge.resolve());
        assert!(!challenge.resolve(), "second touch is dead");
        assert_eq!(challenge.phase(), BonusPhase::Resolved);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut challenge = BonusChallenge::default();
        challenge.begin(&QUESTION);
        challenge.arm_answers();
        challenge.resolve();

        assert!(challenge.finalize());
        assert_eq!(challenge.phase(), BonusPhase::Idle);
        assert!(!challenge.is_active());
        assert!(
            !challenge.finalize(),
            "double finalize must not reschedule again"
        );
    }

    #[test]
    fn test_arm_answers_requires_preparing() {
        let mut challenge = BonusChallenge::default();
        challenge.arm_answers();
        assert_eq!(challenge.phase(), BonusPhase::Idle, "cannot arm from idle");
    }

    #[test]
    fn test_true_false_layout_is_a_left_right_pair() {
        let layout = answer_layout(2);
        assert_eq!(layout.len(), 2);
        assert!(layout[0].x < 0.0 && layout[1].x > 0.0);
        assert!((layout[0].y - layout[1].y).abs() < f32::EPSILON);
    }

    #[test]
    fn test_multiple_choice_layout_spreads_all_options() {
        for count in 3..=5 {
            let layout = answer_layout(count);
            assert_eq!(layout.len(), count);
            for (i, a) in layout.iter().enumerate() {
                for b in layout.iter().skip(i + 1) {
                    assert!(a.distance(*b) > ANSWER_FLOWER_RADIUS, "answers overlap");
                }
            }
        }
    }
}
