use bevy::prelude::*;
use garden_helpers::RoundSummary;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Screen flow of the application
#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
pub enum GameState {
    #[default]
    Loading,
    Welcome,
    Playing,
    Settings,
    Collection,
    GameOver,
}

/// Color category of a flower; pollen may only be delivered between flowers
/// of the same color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum FlowerColor {
    Red,
    Blue,
    Yellow,
    Purple,
}

impl FlowerColor {
    pub const fn render_color(self) -> Color {
        match self {
            Self::Red => Color::srgb(0.92, 0.26, 0.26),
            Self::Blue => Color::srgb(0.3, 0.48, 0.95),
            Self::Yellow => Color::srgb(0.95, 0.84, 0.2),
            Self::Purple => Color::srgb(0.68, 0.36, 0.9),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
        }
    }
}

/// Round difficulty, persisted in the settings record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const fn round_secs(self) -> u32 {
        match self {
            Self::Easy => 90,
            Self::Normal => 60,
            Self::Hard => 45,
        }
    }

    /// How many of the [`FlowerColor`] variants are in play.
    pub const fn color_count(self) -> usize {
        match self {
            Self::Easy => 2,
            Self::Normal => 3,
            Self::Hard => 4,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Easy => Self::Normal,
            Self::Normal => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
        }
    }
}

/// Which overlap detection is currently armed.
///
/// Gameplay flower contacts and bonus-answer contacts are never live at the
/// same time; modals disarm both.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContactRegime {
    #[default]
    Gameplay,
    Challenge,
    Disabled,
}

/// The bee picked pollen up from a flower.
#[derive(Event)]
pub struct CollectedEvent {
    pub color: FlowerColor,
    pub position: Vec2,
}

/// The bee delivered pollen to a matching flower.
#[derive(Event)]
pub struct DeliveredEvent {
    pub position: Vec2,
}

/// A bonus challenge resolved; `correct` is `None` on timeout.
#[derive(Event)]
pub struct BonusResolvedEvent {
    pub correct: Option<bool>,
}

/// The round is over, either because every flower got pollinated or because
/// the countdown ran out.
#[derive(Event)]
pub struct RoundEndedEvent {
    pub summary: RoundSummary,
    pub win: bool,
}

/// Game configuration constants
pub mod config {
    // Scoring
    pub const DELIVERY_SCORE: u32 = 10;
    pub const BONUS_ANSWER_SCORE: u32 = 20;

    // Entities
    pub const FLOWERS_PER_COLOR: usize = 4;
    pub const BEE_SPEED: f32 = 160.0;
    pub const BEE_RADIUS: f32 = 18.0;
    pub const FLOWER_RADIUS: f32 = 22.0;
    pub const ANSWER_FLOWER_RADIUS: f32 = 26.0;

    // Flower placement
    pub const MIN_FLOWER_SPACING: f32 = 70.0;
    pub const PLACEMENT_ATTEMPTS: u32 = 24;
    /// Vertical margin kept clear for the HUD at the top of the window.
    pub const HUD_MARGIN: f32 = 70.0;

    // Bonus challenge timing, seconds. Tunables, not invariants.
    pub const BONUS_MIN_DELAY_SECS: f32 = 12.0;
    pub const BONUS_MAX_DELAY_SECS: f32 = 22.0;
    pub const BONUS_GRACE_SECS: f32 = 1.5;
    pub const BONUS_ANSWER_SECS: f32 = 10.0;
    pub const BONUS_RESULT_SECS: f32 = 2.5;

    // End-of-round delays, seconds
    pub const WIN_DELAY_SECS: f32 = 1.2;
    pub const TIME_UP_DELAY_SECS: f32 = 1.5;

    // Persistence
    pub const TOP_SCORES_SHOWN: usize = 5;
}
