//! Hub and Level states
//!
//! The level itself is updated and drawn by the app underneath. These states
//! only own the pause overlay and, in the hub, the chapter prompt input.

use super::{GameState, StateAction, StateType};
use crate::audio::SoundType;
use crate::game::{EventBus, GameEvent};
use crate::input::{InputAction, InputSource};
use crate::math::{Color, Vec2};
use crate::render::Renderer;
use crate::ui::{TextAnimation, UIAnchor, UILayout, UIText};

const PAUSE_FADE: f32 = 0.3;

const OPTION_RESUME: usize = 0;
const OPTION_QUIT: usize = 1;

pub struct PlayState {
    kind: StateType,
    is_paused: bool,
    pause_title: UIText,
    pause_menu: UILayout,
}

impl PlayState {
    pub fn new(kind: StateType) -> Self {
        debug_assert!(kind.is_gameplay());

        let mut pause_menu = UILayout::new();
        pause_menu.begin(UIAnchor::Center, Vec2::new(0.0, 40.0));
        pause_menu.push_text("Resume", 40.0, Color::WHITE.with_alpha(0.0));
        pause_menu.push_text("Quit", 40.0, Color::WHITE.with_alpha(0.0));
        pause_menu.end();

        Self {
            kind,
            is_paused: false,
            pause_title: UIText::new("Paused", 70.0, UIAnchor::TopCenter, Vec2::ZERO, Color::WHITE.with_alpha(0.0)),
            pause_menu,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    fn set_paused(&mut self, paused: bool) -> StateAction {
        self.is_paused = paused;
        self.pause_title.color.a = 0.0;
        for text in &mut self.pause_menu.texts {
            text.color.a = 0.0;
        }
        self.pause_menu.set_current_option(OPTION_RESUME);
        StateAction::SetPaused(paused)
    }
}

impl GameState for PlayState {
    fn reset(&mut self) {
        self.set_paused(false);
    }

    fn on_enter(&mut self, bus: &mut EventBus) {
        bus.send(GameEvent::MusicPlayed(SoundType::Ambiance));
    }

    fn process_input(&mut self, input: &dyn InputSource, bus: &mut EventBus) -> StateAction {
        if input.action_pressed(InputAction::Pause) {
            bus.send(GameEvent::SoundPlayed(SoundType::UiClick));
            return self.set_paused(!self.is_paused);
        }

        if self.is_paused {
            return match self.pause_menu.update(input, bus) {
                Some(OPTION_RESUME) => self.set_paused(false),
                Some(OPTION_QUIT) => StateAction::ChangeState(StateType::Menu),
                _ => StateAction::None,
            };
        }

        if self.kind == StateType::Hub && input.action_pressed(InputAction::Accept) {
            return StateAction::EnterChapter;
        }
        StateAction::None
    }

    fn render(&mut self, renderer: &mut dyn Renderer, dt: f32) {
        if !self.is_paused {
            return;
        }
        self.pause_title.render_animation(renderer, TextAnimation::FadeIn, PAUSE_FADE, dt);
        self.pause_menu.render_animation(renderer, TextAnimation::FadeIn, PAUSE_FADE, dt);
    }
}
