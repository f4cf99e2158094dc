//! Game-flow states
//!
//! One `GameState` per `StateType`, kept in a table indexed by the type.
//! States never switch themselves: they return a `StateAction` and the app
//! turns it into events, and only a routed `StateChanged` moves the table's
//! cursor.

mod credits;
mod level_state;
mod lost;
mod menu;
mod won;

pub use credits::{load_credits, CreditsState, DEFAULT_CREDITS};
pub use level_state::PlayState;
pub use lost::LostState;
pub use menu::MenuState;
pub use won::WonState;

use crate::dialogue::Dialogue;
use crate::game::{EventBus, GameEvent};
use crate::input::InputSource;
use crate::render::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateType {
    Menu,
    Hub,
    Level,
    Won,
    Lost,
    Credits,
}

impl StateType {
    pub const COUNT: usize = 6;

    pub const ALL: [StateType; Self::COUNT] = [
        StateType::Menu,
        StateType::Hub,
        StateType::Level,
        StateType::Won,
        StateType::Lost,
        StateType::Credits,
    ];

    /// Hub and Level run the level simulation underneath their UI
    pub fn is_gameplay(&self) -> bool {
        matches!(self, StateType::Hub | StateType::Level)
    }
}

/// What a state asks the app to do after reading input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateAction {
    None,
    ChangeState(StateType),
    /// Continue to whatever comes after the won level
    Advance,
    /// New volumes in [0, 1], to apply and persist
    ApplyVolume { master: f32, music: f32, sfx: f32 },
    /// Start the chapter whose point the player stands on
    EnterChapter,
    SetPaused(bool),
    Quit,
}

pub trait GameState {
    /// Hide the state's texts so they fade in again
    fn reset(&mut self);

    /// Called after `reset` when the state becomes current
    fn on_enter(&mut self, _bus: &mut EventBus) {}

    fn process_input(&mut self, input: &dyn InputSource, bus: &mut EventBus) -> StateAction;

    fn render(&mut self, renderer: &mut dyn Renderer, dt: f32);
}

pub struct StateManager {
    states: Vec<Box<dyn GameState>>,
    current: StateType,
}

impl StateManager {
    /// Build every state. `volumes` are the saved volumes in [0, 1].
    pub fn new(dialogue: Dialogue, credits: Vec<String>, volumes: (f32, f32, f32)) -> Self {
        let states: Vec<Box<dyn GameState>> = vec![
            Box::new(MenuState::new(volumes)),
            Box::new(PlayState::new(StateType::Hub)),
            Box::new(PlayState::new(StateType::Level)),
            Box::new(WonState::new(dialogue)),
            Box::new(LostState::new()),
            Box::new(CreditsState::new(credits)),
        ];
        debug_assert_eq!(states.len(), StateType::COUNT);

        Self {
            states,
            current: StateType::Menu,
        }
    }

    pub fn current(&self) -> StateType {
        self.current
    }

    pub fn state_mut(&mut self, ty: StateType) -> &mut dyn GameState {
        self.states[ty as usize].as_mut()
    }

    /// Make `to` current, resetting it first.
    pub fn change(&mut self, to: StateType, bus: &mut EventBus) {
        log::debug!("State {:?} -> {:?}", self.current, to);
        self.current = to;

        let state = self.states[to as usize].as_mut();
        state.reset();
        state.on_enter(bus);
    }

    /// Only `StateChanged` is used.
    pub fn handle_event(&mut self, event: &GameEvent, bus: &mut EventBus) -> bool {
        match *event {
            GameEvent::StateChanged(to) => {
                self.change(to, bus);
                true
            }
            _ => false,
        }
    }

    pub fn process_input(&mut self, input: &dyn InputSource, bus: &mut EventBus) -> StateAction {
        self.states[self.current as usize].process_input(input, bus)
    }

    pub fn render(&mut self, renderer: &mut dyn Renderer, dt: f32) {
        self.states[self.current as usize].render(renderer, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundType;
    use crate::input::testing::ScriptedInput;
    use crate::input::InputAction;

    fn manager() -> StateManager {
        StateManager::new(Dialogue::parse("one;\ntwo;\n"), vec!["Someone".to_string()], (1.0, 1.0, 1.0))
    }

    #[test]
    fn test_table_covers_every_state() {
        let mut states = manager();
        let mut bus = EventBus::new();
        for ty in StateType::ALL {
            states.change(ty, &mut bus);
            assert_eq!(states.current(), ty);
        }
    }

    #[test]
    fn test_only_state_changed_switches() {
        let mut states = manager();
        let mut bus = EventBus::new();

        assert!(!states.handle_event(&GameEvent::LevelWon, &mut bus));
        assert_eq!(states.current(), StateType::Menu);

        assert!(states.handle_event(&GameEvent::StateChanged(StateType::Lost), &mut bus));
        assert_eq!(states.current(), StateType::Lost);
    }

    #[test]
    fn test_entering_menu_plays_hub_music() {
        let mut states = manager();
        let mut bus = EventBus::new();
        states.change(StateType::Menu, &mut bus);
        assert_eq!(bus.drain(), vec![GameEvent::MusicPlayed(SoundType::Hub)]);
    }

    #[test]
    fn test_input_goes_to_current_state() {
        let mut states = manager();
        let mut bus = EventBus::new();
        states.change(StateType::Lost, &mut bus);

        let input = ScriptedInput::pressing(&[InputAction::Accept]);
        assert_eq!(
            states.process_input(&input, &mut bus),
            StateAction::ChangeState(StateType::Level)
        );
    }
}
