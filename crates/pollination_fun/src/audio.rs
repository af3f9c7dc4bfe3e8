use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use bevy_kira_audio::prelude::*;

use crate::core::{BonusResolvedEvent, CollectedEvent, DeliveredEvent, GameState, RoundEndedEvent};
use crate::storage::{ActiveSettings, MAX_VOLUME};

#[derive(AssetCollection, Resource)]
struct AudioAssets {
    #[asset(path = "audio/collect.ogg")]
    collect: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/deliver.ogg")]
    deliver: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/bonus_correct.ogg")]
    bonus_correct: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/bonus_wrong.ogg")]
    bonus_wrong: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/round_end.ogg")]
    round_end: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/meadow_loop.ogg")]
    music: Handle<bevy_kira_audio::prelude::AudioSource>,
}

fn effects_volume(settings: &ActiveSettings) -> f64 {
    f64::from(settings.0.effects_volume) / f64::from(MAX_VOLUME)
}

fn music_volume(settings: &ActiveSettings) -> f64 {
    f64::from(settings.0.music_volume) / f64::from(MAX_VOLUME)
}

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .add_loading_state(
                LoadingState::new(GameState::Loading)
                    .continue_to_state(GameState::Welcome)
                    .load_collection::<AudioAssets>(),
            )
            .add_systems(OnEnter(GameState::Playing), start_music)
            .add_systems(OnExit(GameState::Playing), stop_music)
            .add_systems(
                Update,
                (collect_audio, deliver_audio, bonus_audio, round_end_audio)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn start_music(audio_assets: Res<AudioAssets>, audio: Res<Audio>, settings: Res<ActiveSettings>) {
    audio
        .play(audio_assets.music.clone_weak())
        .looped()
        .with_volume(music_volume(&settings));
}

fn stop_music(audio: Res<Audio>) {
    audio.stop();
}

fn collect_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    settings: Res<ActiveSettings>,
    mut collected_events: EventReader<CollectedEvent>,
) {
    for _ in collected_events.read() {
        audio
            .play(audio_assets.collect.clone_weak())
            .with_volume(effects_volume(&settings));
    }
}

fn deliver_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    settings: Res<ActiveSettings>,
    mut delivered_events: EventReader<DeliveredEvent>,
) {
    for _ in delivered_events.read() {
        audio
            .play(audio_assets.deliver.clone_weak())
            .with_volume(effects_volume(&settings));
    }
}

fn bonus_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    settings: Res<ActiveSettings>,
    mut resolved_events: EventReader<BonusResolvedEvent>,
) {
    for event in resolved_events.read() {
        let handle = if event.correct == Some(true) {
            audio_assets.bonus_correct.clone_weak()
        } else {
            audio_assets.bonus_wrong.clone_weak()
        };
        audio.play(handle).with_volume(effects_volume(&settings));
    }
}

fn round_end_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    settings: Res<ActiveSettings>,
    mut round_ended_events: EventReader<RoundEndedEvent>,
) {
    for _ in round_ended_events.read() {
        audio
            .play(audio_assets.round_end.clone_weak())
            .with_volume(effects_volume(&settings));
    }
}
