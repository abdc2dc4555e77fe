use std::cell::RefCell;
use std::rc::Rc;

use invaders::bootstrap::register_factories;
use invaders::config::{GameConfig, SoundConfig, SoundCue};
use invaders::entities::{GridPos, ProjectileOwner};
use invaders::events::{EventBus, GameEvent, GameEventListener};
use invaders::services::ServiceLocator;
use invaders::sound::{
    AudioOutput, AudioSink, SoundBank, SoundManager, CUE_BACKGROUND_MUSIC, CUE_EXPLOSION,
    CUE_PLAYER_HIT, CUE_PROJECTILE,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Play { key: String, volume: f32, looping: bool },
    Stop { key: String },
}

#[derive(Default)]
struct RecordingSink {
    calls: Vec<Call>,
}

impl AudioSink for RecordingSink {
    fn play(&mut self, key: &str, _cue: &SoundCue, volume: f32, looping: bool) {
        self.calls.push(Call::Play {
            key: key.to_string(),
            volume,
            looping,
        });
    }

    fn stop(&mut self, key: &str) {
        self.calls.push(Call::Stop {
            key: key.to_string(),
        });
    }
}

fn manager_with_sink() -> (SoundManager, Rc<RefCell<RecordingSink>>) {
    let sink = Rc::new(RefCell::new(RecordingSink::default()));
    let config = SoundConfig::default();
    let bank = Rc::new(SoundBank::from_config(&config));
    let manager = SoundManager::new(bank, AudioOutput(sink.clone()), &config);
    (manager, sink)
}

fn played_keys(sink: &RefCell<RecordingSink>) -> Vec<String> {
    sink.borrow()
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Play { key, .. } => Some(key.clone()),
            Call::Stop { .. } => None,
        })
        .collect()
}

// ── Sound bank ────────────────────────────────────────────────────────────────

#[test]
fn bank_is_built_from_config() {
    let bank = SoundBank::from_config(&SoundConfig::default());
    assert_eq!(bank.len(), 4);
    assert!(bank.get(CUE_PROJECTILE).is_some());
    assert!(bank.get(CUE_PLAYER_HIT).is_some());
    assert!(bank.get(CUE_EXPLOSION).is_some());
    assert!(bank.get(CUE_BACKGROUND_MUSIC).is_some());
    assert!(bank.get("Nope").is_none());
}

#[test]
fn bank_add_and_clear() {
    let mut bank = SoundBank::default();
    assert!(bank.is_empty());
    bank.add(CUE_PLAYER_HIT, SoundCue::default());
    assert_eq!(bank.len(), 1);
    bank.clear();
    assert!(bank.is_empty());
}

// ── Manager ───────────────────────────────────────────────────────────────────

#[test]
fn effects_use_cue_volume_scaled_by_sfx_volume() {
    let (mut manager, sink) = manager_with_sink();
    manager.set_sfx_volume(0.5);
    assert!(manager.play_effect(CUE_PROJECTILE, None));
    assert!(manager.play_effect(CUE_EXPLOSION, Some(0.25)));
    assert_eq!(
        sink.borrow().calls,
        vec![
            Call::Play { key: CUE_PROJECTILE.into(), volume: 0.3, looping: false },
            Call::Play { key: CUE_EXPLOSION.into(), volume: 0.25, looping: false },
        ]
    );
}

#[test]
fn unknown_cue_is_skipped() {
    let (mut manager, sink) = manager_with_sink();
    assert!(!manager.play_effect("Nope", None));
    assert!(!manager.play_music("Nope"));
    assert!(sink.borrow().calls.is_empty());
}

#[test]
fn muted_effects_play_silently() {
    let (mut manager, sink) = manager_with_sink();
    manager.toggle_sfx(false);
    manager.play_effect(CUE_PROJECTILE, None);
    manager.toggle_sfx(true);
    manager.toggle_sound(false);
    manager.play_effect(CUE_PROJECTILE, Some(1.0));

    for call in &sink.borrow().calls {
        if let Call::Play { volume, .. } = call {
            assert_eq!(*volume, 0.0);
        }
    }
    assert!(!manager.is_sound_enabled());
}

#[test]
fn music_loops_and_follows_toggles() {
    let (mut manager, sink) = manager_with_sink();
    assert!(manager.play_music(CUE_BACKGROUND_MUSIC));
    manager.toggle_music(false);
    manager.toggle_music(true);
    manager.stop_music();
    // Nothing left to stop
    manager.stop_music();

    let music = CUE_BACKGROUND_MUSIC.to_string();
    assert_eq!(
        sink.borrow().calls,
        vec![
            Call::Play { key: music.clone(), volume: 1.0, looping: true },
            Call::Play { key: music.clone(), volume: 0.0, looping: true },
            Call::Play { key: music.clone(), volume: 1.0, looping: true },
            Call::Stop { key: music },
        ]
    );
}

#[test]
fn volumes_are_clamped() {
    let (mut manager, sink) = manager_with_sink();
    manager.set_sfx_volume(3.0);
    manager.play_effect(CUE_EXPLOSION, None);
    assert_eq!(
        sink.borrow().calls[0],
        Call::Play { key: CUE_EXPLOSION.into(), volume: 0.8, looping: false }
    );
}

// ── Event mapping ─────────────────────────────────────────────────────────────

#[test]
fn game_events_trigger_cues() {
    let (mut manager, sink) = manager_with_sink();
    manager.on_event(&GameEvent::ProjectileFired { owner: ProjectileOwner::Player });
    manager.on_event(&GameEvent::ProjectileFired { owner: ProjectileOwner::Enemy });
    manager.on_event(&GameEvent::EnemyKilled { slot: GridPos { row: 0, col: 0 } });
    manager.on_event(&GameEvent::ObstacleHit);
    manager.on_event(&GameEvent::PlayerHit { health: 2 });

    assert_eq!(
        played_keys(&sink),
        vec![CUE_PROJECTILE, CUE_EXPLOSION, CUE_EXPLOSION, CUE_PLAYER_HIT]
    );
}

#[test]
fn music_starts_with_the_first_wave_and_stops_at_the_end() {
    let (mut manager, sink) = manager_with_sink();
    manager.on_event(&GameEvent::WaveStarted { level: 1, health: 3 });
    manager.on_event(&GameEvent::WaveStarted { level: 2, health: 3 });
    assert_eq!(played_keys(&sink), vec![CUE_BACKGROUND_MUSIC]);

    manager.on_event(&GameEvent::PlayerWon);
    assert_eq!(
        sink.borrow().calls.last(),
        Some(&Call::Stop { key: CUE_BACKGROUND_MUSIC.into() })
    );
}

#[test]
fn event_bus_fans_out_to_the_sound_manager() {
    let (manager, sink) = manager_with_sink();
    let manager = Rc::new(RefCell::new(manager));
    let mut bus = EventBus::new();
    let id = bus.subscribe(manager.clone());
    assert_eq!(bus.len(), 1);

    bus.publish(&GameEvent::ObstacleHit);
    assert_eq!(played_keys(&sink).len(), 1);

    assert!(bus.unsubscribe(id));
    assert!(bus.is_empty());
    bus.publish(&GameEvent::ObstacleHit);
    assert_eq!(played_keys(&sink).len(), 1);
}

// ── Service wiring ────────────────────────────────────────────────────────────

#[test]
fn registered_sound_manager_plays_through_registered_output() {
    let sink = Rc::new(RefCell::new(RecordingSink::default()));
    let services = ServiceLocator::new();
    register_factories(&services, GameConfig::default(), AudioOutput(sink.clone()));

    let manager = services.get_service::<RefCell<SoundManager>>().unwrap();
    assert!(Rc::ptr_eq(
        &manager,
        &services.get_service::<RefCell<SoundManager>>().unwrap()
    ));
    manager.borrow_mut().play_effect(CUE_PROJECTILE, None);
    assert_eq!(played_keys(&sink), vec![CUE_PROJECTILE]);
}
