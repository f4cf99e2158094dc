//! Application
//!
//! Owns the physics world, the level manager, the state table and the sound
//! manager, and routes the frame's events between them. Backends (window,
//! audio device, input devices) stay outside and are handed in per call.

use crate::audio::{AudioBackend, SoundManager};
use crate::config::GameConfig;
use crate::dialogue::Dialogue;
use crate::game::{EventBus, GameEvent, Level, LevelManager};
use crate::input::{InputAction, InputSource};
use crate::math::Vec3;
use crate::physics::{BoxWorld, Physics};
use crate::render::Renderer;
use crate::resources::ResourceDatabase;
use crate::state::{load_credits, StateAction, StateManager, StateType};
use crate::world::SaveData;

/// Events routed per frame before the rest of the queue is dropped
pub const EVENTS_PER_FRAME_MAX: usize = 64;

pub struct App {
    physics: BoxWorld,
    levels: LevelManager,
    states: StateManager,
    sounds: SoundManager,
    bus: EventBus,
    is_running: bool,
}

impl App {
    pub fn new(config: &GameConfig, resources: ResourceDatabase) -> Self {
        let mut physics = BoxWorld::new();
        physics.set_gravity(Vec3::ZERO);
        physics.set_iterations(config.physics_iterations);

        let save = SaveData::load_or_default(config.resolved_save_path());
        let (master, music, sfx) = save.volume();

        let mut sounds = SoundManager::new(&resources);
        sounds.set_volumes(master, music, sfx);

        let dialogue = Dialogue::load_or_empty(&config.dialogue_path);
        let credits = load_credits(&config.credits_path);
        let states = StateManager::new(dialogue, credits, (master, music, sfx));

        let mut level = Level::new(config, resources);
        if config.start_in_editor {
            level.toggle_editor(&mut physics);
        }

        let mut app = Self {
            physics,
            levels: LevelManager::new(config, level, save),
            states,
            sounds,
            bus: EventBus::new(),
            is_running: true,
        };
        app.states.change(StateType::Menu, &mut app.bus);
        app
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn current_state(&self) -> StateType {
        self.states.current()
    }

    pub fn levels(&self) -> &LevelManager {
        &self.levels
    }

    pub fn physics(&self) -> &BoxWorld {
        &self.physics
    }

    /// For registering listeners that watch routed events
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    // =========================================================================
    // Frame
    // =========================================================================

    pub fn update(&mut self, input: &dyn InputSource, audio: &mut dyn AudioBackend, dt: f32) {
        if input.action_pressed(InputAction::Quit) {
            self.bus.send(GameEvent::AppQuit);
        }

        let action = self.states.process_input(input, &mut self.bus);
        self.apply_action(action, audio);

        if self.states.current().is_gameplay() {
            self.levels.level_mut().update(input, &mut self.physics, &mut self.bus, dt);
        }

        self.route_events(audio);
    }

    pub fn render(&mut self, renderer: &mut dyn Renderer, dt: f32) {
        if self.states.current().is_gameplay() {
            self.levels.render(&self.physics, renderer);
            self.levels.render_hud(renderer, dt);
        }
        self.states.render(renderer, dt);
    }

    fn apply_action(&mut self, action: StateAction, audio: &mut dyn AudioBackend) {
        match action {
            StateAction::None => {}
            StateAction::ChangeState(to) => self.bus.send(GameEvent::StateChanged(to)),
            StateAction::Advance => {
                if let Err(e) = self.levels.advance(&mut self.physics, &mut self.bus) {
                    log::error!("Failed to advance: {}", e);
                }
            }
            StateAction::ApplyVolume { master, music, sfx } => {
                if let Err(e) = self.levels.save_data_mut().set_volume(master, music, sfx) {
                    log::error!("Failed to save volumes: {}", e);
                }
                let (master, music, sfx) = self.levels.save_data().volume();
                self.sounds.set_volumes(master, music, sfx);
                self.sounds.refresh_music(audio);
            }
            StateAction::EnterChapter => {
                if let Err(e) = self.levels.enter_chapter(&mut self.physics, &mut self.bus) {
                    log::error!("Failed to enter chapter: {}", e);
                }
            }
            StateAction::SetPaused(paused) => self.levels.level_mut().set_paused(paused),
            StateAction::Quit => self.bus.send(GameEvent::AppQuit),
        }
    }

    /// Deliver queued events, including the ones queued while routing, up to
    /// `EVENTS_PER_FRAME_MAX`.
    fn route_events(&mut self, audio: &mut dyn AudioBackend) {
        let mut routed = 0;
        loop {
            let events = self.bus.drain();
            if events.is_empty() {
                return;
            }

            for event in events {
                if routed == EVENTS_PER_FRAME_MAX {
                    log::warn!("More than {} events this frame, dropping the rest", EVENTS_PER_FRAME_MAX);
                    self.bus.clear();
                    return;
                }
                routed += 1;
                self.route(&event, audio);
            }
        }
    }

    fn route(&mut self, event: &GameEvent, audio: &mut dyn AudioBackend) {
        self.bus.dispatch(event);

        match *event {
            GameEvent::LevelWon => {
                self.sounds.handle_event(audio, event);
                self.bus.send(GameEvent::StateChanged(StateType::Won));
            }
            GameEvent::LevelLost => {
                self.sounds.handle_event(audio, event);
                self.bus.send(GameEvent::StateChanged(StateType::Lost));
            }
            GameEvent::AppQuit => {
                log::info!("Quit requested");
                self.is_running = false;
            }
            _ => {
                self.levels.handle_event(event, &mut self.physics);
                self.states.handle_event(event, &mut self.bus);
                self.sounds.handle_event(audio, event);
            }
        }
    }
}
