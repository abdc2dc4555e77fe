mod display;

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::Print,
    terminal,
    ExecutableCommand,
};
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;

use invaders::bootstrap::register_factories;
use invaders::config::{GameConfig, SoundCue, DEFAULT_CONFIG_PATH};
use invaders::entities::{GameState, PlayerInput};
use invaders::game_manager::GameManager;
use invaders::hud::Hud;
use invaders::logging::{self, DEFAULT_LOG_PATH};
use invaders::services::ServiceLocator;
use invaders::sound::{AudioOutput, AudioSink, SoundManager};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest frame the simulation will accept; a stalled terminal must not
/// teleport the formation.
const MAX_DT: f32 = 0.1;

/// Frames a key stays "down" after its last press or repeat event. Terminals
/// without release events only report auto-repeat (15 Hz or faster), so
/// four frames at 30 FPS bridge the gap between repeats.
const HOLD_WINDOW: u64 = 4;

/// Tracks which keys are down, by the frame each was last reported.
#[derive(Default)]
struct HeldKeys {
    last_seen: HashMap<KeyCode, u64>,
    frame: u64,
}

impl HeldKeys {
    fn next_frame(&mut self) {
        self.frame += 1;
    }

    fn touch(&mut self, code: KeyCode) {
        self.last_seen.insert(code, self.frame);
    }

    fn release(&mut self, code: &KeyCode) {
        self.last_seen.remove(code);
    }

    fn any(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|key| {
            self.last_seen
                .get(key)
                .map_or(false, |&seen| self.frame.saturating_sub(seen) <= HOLD_WINDOW)
        })
    }

    /// Movement and fire intent. Opposite directions cancel out.
    fn input(&self) -> PlayerInput {
        let left = self.any(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]);
        let right = self.any(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]);
        let axis = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        PlayerInput {
            axis,
            shoot: self.any(&[KeyCode::Char(' ')]),
        }
    }
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// The terminal can only beep: cues flagged `bell` ring it once per frame.
#[derive(Default)]
struct BellSink {
    pending: bool,
}

impl BellSink {
    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl AudioSink for BellSink {
    fn play(&mut self, _key: &str, cue: &SoundCue, volume: f32, looping: bool) {
        if cue.bell && !looping && volume > 0.0 {
            self.pending = true;
        }
    }

    fn stop(&mut self, _key: &str) {}
}

// ── Game loop ─────────────────────────────────────────────────────────────────

struct Frontend {
    hud: Rc<RefCell<Hud>>,
    sound: Option<Rc<RefCell<SoundManager>>>,
    bell: Rc<RefCell<BellSink>>,
}

/// What a single key press asks the front end to do.
enum Command {
    Quit,
    Continue,
}

fn handle_press(
    code: KeyCode,
    modifiers: KeyModifiers,
    game: &mut GameManager,
    frontend: &Frontend,
) -> Command {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Command::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Command::Quit,
        KeyCode::Enter => match game.state() {
            GameState::Idle => {
                game.start();
            }
            GameState::Won | GameState::Lost => {
                game.restart();
                game.start();
            }
            GameState::WaveCountdown | GameState::Playing => {}
        },
        KeyCode::Char('m') | KeyCode::Char('M') => {
            if let Some(sound) = &frontend.sound {
                let mut sound = sound.borrow_mut();
                let enabled = sound.is_sound_enabled();
                sound.toggle_sound(!enabled);
            }
        }
        _ => {}
    }
    Command::Continue
}

/// Frame loop: drain input, step the simulation by the real elapsed time,
/// draw, then sleep out the rest of the frame budget.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut GameManager,
    frontend: &Frontend,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let mut keys = HeldKeys::default();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        keys.next_frame();

        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    keys.touch(code);
                    if let Command::Quit = handle_press(code, modifiers, game, frontend) {
                        return Ok(());
                    }
                }
                KeyEventKind::Repeat => keys.touch(code),
                KeyEventKind::Release => keys.release(&code),
            }
        }
        game.set_input(keys.input());

        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f32().min(MAX_DT);
        last_tick = now;
        game.update(dt);

        let muted = frontend
            .sound
            .as_ref()
            .map_or(false, |sound| !sound.borrow().is_sound_enabled());
        display::render(out, game.world(), &frontend.hud.borrow(), muted)?;
        if frontend.bell.borrow_mut().take() {
            out.execute(Print('\u{7}'))?;
        }

        if let Some(rest) = FRAME.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    if let Err(err) = logging::init(DEFAULT_LOG_PATH, LevelFilter::Info) {
        eprintln!("Logging disabled: {}", err);
    }

    let config = GameConfig::load_or_default(DEFAULT_CONFIG_PATH).map_err(|err| {
        log::error!("{}", err);
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    })?;

    let services = ServiceLocator::new();
    let bell = Rc::new(RefCell::new(BellSink::default()));
    register_factories(&services, config, AudioOutput(bell.clone()));

    let mut game = GameManager::from_services(&services, StdRng::from_entropy())
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let hud = match services.get_service::<RefCell<Hud>>() {
        Some(hud) => hud,
        None => {
            let hud = Rc::new(RefCell::new(Hud::new()));
            game.subscribe(hud.clone());
            hud
        }
    };
    let frontend = Frontend {
        hud,
        sound: services.get_service::<RefCell<SoundManager>>(),
        bell,
    };

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Release events need the kitty keyboard protocol; without it the hold
    // window above takes over.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread; the loop only polls the channel.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut game, &frontend, &rx);
    game.shutdown();
    log::info!("Exiting");

    // Restore the terminal even if the loop failed.
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
