use std::sync::Arc;

use bevy::prelude::Resource;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::Difficulty;

/// Upper bound on persisted score records; older low scores fall off.
const MAX_SAVED_SCORES: usize = 50;

pub const MAX_VOLUME: u8 = 10;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,

    #[error("record serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage rejected the operation: {0}")]
    Backend(String),
}

/// One finished round, append-only, ranked by score for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u32,
    pub timestamp_ms: u64,
    pub completed_flowers: u32,
    pub total_time_secs: u32,
}

/// Player preferences, singleton record, last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub music_volume: u8,
    pub effects_volume: u8,
    pub difficulty: Difficulty,
    pub show_facts: bool,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            music_volume: 6,
            effects_volume: 8,
            difficulty: Difficulty::default(),
            show_facts: true,
        }
    }
}

impl SettingsRecord {
    /// Volumes outside the 0..=10 range are pulled back in; old records
    /// written by other frontends may carry anything.
    pub fn clamped(mut self) -> Self {
        self.music_volume = self.music_volume.min(MAX_VOLUME);
        self.effects_volume = self.effects_volume.min(MAX_VOLUME);
        self
    }
}

/// Discovery progress of one catalog species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub species_id: String,
    pub count: u32,
}

/// The persistence contract of the game.
///
/// Callers treat every operation as fire-and-forget: failures are logged by
/// the [`Storage`] wrapper and never interrupt gameplay.
pub trait StorageGateway: Send + Sync + 'static {
    fn save_score(&self, record: ScoreRecord) -> Result<(), StorageError>;
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, StorageError>;
    fn settings(&self) -> Result<Option<SettingsRecord>, StorageError>;
    fn save_settings(&self, settings: &SettingsRecord) -> Result<(), StorageError>;
    fn discovery_state(&self) -> Result<Vec<DiscoveryRecord>, StorageError>;
    fn save_discovery_state(&self, records: &[DiscoveryRecord]) -> Result<(), StorageError>;
}

fn rank_scores(scores: &mut Vec<ScoreRecord>) {
    scores.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.timestamp_ms.cmp(&b.timestamp_ms))
    });
    scores.truncate(MAX_SAVED_SCORES);
}

/// In-memory gateway used on native targets and in tests.
#[derive(Default)]
pub struct MemoryGateway {
    inner: Mutex<MemoryStore>,
}

#[derive(Default)]
struct MemoryStore {
    scores: Vec<ScoreRecord>,
    settings: Option<SettingsRecord>,
    discovery: Vec<DiscoveryRecord>,
}

impl StorageGateway for MemoryGateway {
    fn save_score(&self, record: ScoreRecord) -> Result<(), StorageError> {
        let mut store = self.inner.lock();
        store.scores.push(record);
        rank_scores(&mut store.scores);
        Ok(())
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, StorageError> {
        let store = self.inner.lock();
        Ok(store.scores.iter().take(limit).copied().collect())
    }

    fn settings(&self) -> Result<Option<SettingsRecord>, StorageError> {
        Ok(self.inner.lock().settings)
    }

    fn save_settings(&self, settings: &SettingsRecord) -> Result<(), StorageError> {
        self.inner.lock().settings = Some(*settings);
        Ok(())
    }

    fn discovery_state(&self) -> Result<Vec<DiscoveryRecord>, StorageError> {
        Ok(self.inner.lock().discovery.clone())
    }

    fn save_discovery_state(&self, records: &[DiscoveryRecord]) -> Result<(), StorageError> {
        self.inner.lock().discovery = records.to_vec();
        Ok(())
    }
}

/// localStorage-backed gateway for the browser build. The records are a few
/// hundred bytes of JSON, well under any storage quota.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct LocalStorageGateway;

#[cfg(target_arch = "wasm32")]
mod local_storage {
    use super::{
        DiscoveryRecord, ScoreRecord, SettingsRecord, StorageError, StorageGateway, rank_scores,
    };

    const SCORES_KEY: &str = "pollination_fun.scores";
    const SETTINGS_KEY: &str = "pollination_fun.settings";
    const DISCOVERY_KEY: &str = "pollination_fun.discovery";

    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|err| StorageError::Backend(format!("{err:?}")))?
            .ok_or(StorageError::Unavailable)
    }

    fn read<T: serde::de::DeserializeOwned>(key: &str) -> Result<Option<T>, StorageError> {
        let storage = storage()?;
        let Some(raw) = storage
            .get_item(key)
            .map_err(|err| StorageError::Backend(format!("{err:?}")))?
        else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write<T: serde::Serialize>(key: &str, value: &T) -> Result<(), StorageError> {
        let storage = storage()?;
        let raw = serde_json::to_string(value)?;
        storage
            .set_item(key, &raw)
            .map_err(|err| StorageError::Backend(format!("{err:?}")))
    }

    impl StorageGateway for super::LocalStorageGateway {
        fn save_score(&self, record: ScoreRecord) -> Result<(), StorageError> {
            let mut scores: Vec<ScoreRecord> = read(SCORES_KEY)?.unwrap_or_default();
            scores.push(record);
            rank_scores(&mut scores);
            write(SCORES_KEY, &scores)
        }

        fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, StorageError> {
            let scores: Vec<ScoreRecord> = read(SCORES_KEY)?.unwrap_or_default();
            Ok(scores.into_iter().take(limit).collect())
        }

        fn settings(&self) -> Result<Option<SettingsRecord>, StorageError> {
            read(SETTINGS_KEY)
        }

        fn save_settings(&self, settings: &SettingsRecord) -> Result<(), StorageError> {
            write(SETTINGS_KEY, settings)
        }

        fn discovery_state(&self) -> Result<Vec<DiscoveryRecord>, StorageError> {
            Ok(read(DISCOVERY_KEY)?.unwrap_or_default())
        }

        fn save_discovery_state(&self, records: &[DiscoveryRecord]) -> Result<(), StorageError> {
            write(DISCOVERY_KEY, &records.to_vec())
        }
    }
}

/// The injected persistence service. Systems call the `*_logged` helpers,
/// which swallow gateway failures after logging them; a missed save is
/// invisible to the player by design of the game, not worth interrupting a
/// round for.
#[derive(Resource, Clone)]
pub struct Storage(Arc<dyn StorageGateway>);

impl Storage {
    pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
        Self(gateway)
    }

    /// The gateway matching the compile target: browser localStorage on
    /// wasm, a process-local store everywhere else.
    pub fn for_target() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self::new(Arc::new(LocalStorageGateway))
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::new(Arc::new(MemoryGateway::default()))
        }
    }

    pub fn save_score_logged(&self, record: ScoreRecord) {
        if let Err(err) = self.0.save_score(record) {
            warn!("score not saved: {err}");
        }
    }

    pub fn top_scores_logged(&self, limit: usize) -> Vec<ScoreRecord> {
        self.0.top_scores(limit).unwrap_or_else(|err| {
            warn!("could not load scores: {err}");
            Vec::new()
        })
    }

    pub fn settings_logged(&self) -> SettingsRecord {
        match self.0.settings() {
            Ok(Some(settings)) => settings.clamped(),
            Ok(None) => SettingsRecord::default(),
            Err(err) => {
                warn!("could not load settings: {err}");
                SettingsRecord::default()
            }
        }
    }

    pub fn save_settings_logged(&self, settings: &SettingsRecord) {
        if let Err(err) = self.0.save_settings(settings) {
            warn!("settings not saved: {err}");
        }
    }

    pub fn discovery_logged(&self) -> Vec<DiscoveryRecord> {
        self.0.discovery_state().unwrap_or_else(|err| {
            warn!("could not load discovery state: {err}");
            Vec::new()
        })
    }

    pub fn save_discovery_logged(&self, records: &[DiscoveryRecord]) {
        if let Err(err) = self.0.save_discovery_state(records) {
            warn!("discovery state not saved: {err}");
        }
    }
}

/// The settings currently in effect, loaded once at startup and updated by
/// the settings screen.
#[derive(Resource, Default)]
pub struct ActiveSettings(pub SettingsRecord);

/// Milliseconds since the Unix epoch, for score timestamps.
pub fn now_millis() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: u32, timestamp_ms: u64) -> ScoreRecord {
        ScoreRecord {
            score,
            timestamp_ms,
            completed_flowers: score / 10,
            total_time_secs: 60,
        }
    }

    #[test]
    fn test_top_scores_ranked_descending() {
        let gateway = MemoryGateway::default();
        gateway.save_score(record(30, 1)).expect("save");
        gateway.save_score(record(90, 2)).expect("save");
        gateway.save_score(record(60, 3)).expect("save");

        let top = gateway.top_scores(2).expect("load");
        assert_eq!(top.len(), 2, "limit respected");
        assert_eq!(top[0].score, 90, "best score first");
        assert_eq!(top[1].score, 60, "second best next");
    }

    #[test]
    fn test_equal_scores_keep_earliest_first() {
        let gateway = MemoryGateway::default();
        gateway.save_score(record(50, 200)).expect("save");
        gateway.save_score(record(50, 100)).expect("save");

        let top = gateway.top_scores(5).expect("load");
        assert_eq!(top[0].timestamp_ms, 100, "earlier run ranks first on ties");
    }

    #[test]
    fn test_score_history_is_bounded() {
        let gateway = MemoryGateway::default();
        for i in 0..(MAX_SAVED_SCORES as u32 + 20) {
            gateway.save_score(record(i, u64::from(i))).expect("save");
        }

        let all = gateway.top_scores(usize::MAX).expect("load");
        assert_eq!(all.len(), MAX_SAVED_SCORES, "history truncated");
        assert_eq!(all[0].score, MAX_SAVED_SCORES as u32 + 19, "best kept");
    }

    #[test]
    fn test_settings_round_trip_and_default() {
        let gateway = MemoryGateway::default();
        assert_eq!(gateway.settings().expect("load"), None, "empty store");

        let settings = SettingsRecord {
            music_volume: 3,
            effects_volume: 9,
            difficulty: Difficulty::Hard,
            show_facts: false,
        };
        gateway.save_settings(&settings).expect("save");
        assert_eq!(gateway.settings().expect("load"), Some(settings));
    }

    #[test]
    fn test_settings_clamp_pulls_volumes_into_range() {
        let settings = SettingsRecord {
            music_volume: 250,
            effects_volume: 11,
            ..SettingsRecord::default()
        }
        .clamped();
        assert_eq!(settings.music_volume, MAX_VOLUME);
        assert_eq!(settings.effects_volume, MAX_VOLUME);
    }

    #[test]
    fn test_discovery_state_last_write_wins() {
        let gateway = MemoryGateway::default();
        let first = vec![DiscoveryRecord {
            species_id: "poppy".to_string(),
            count: 1,
        }];
        let second = vec![
            DiscoveryRecord {
                species_id: "poppy".to_string(),
                count: 2,
            },
            DiscoveryRecord {
                species_id: "cornflower".to_string(),
                count: 1,
            },
        ];
        gateway.save_discovery_state(&first).expect("save");
        gateway.save_discovery_state(&second).expect("save");
        assert_eq!(gateway.discovery_state().expect("load"), second);
    }
}
