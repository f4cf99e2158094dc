//! Shown after the player is hit

use super::{GameState, StateAction, StateType};
use crate::game::EventBus;
use crate::input::InputSource;
use crate::math::{Color, Vec2};
use crate::render::Renderer;
use crate::ui::{TextAnimation, UIAnchor, UILayout, UIText};

const TITLE: &str = "To give up is a virtue. Do not continue.\nGive it all up and live a peaceful life.";
const TITLE_FADE: f32 = 1.0;
const OPTIONS_FADE: f32 = 1.5;

pub struct LostState {
    title: UIText,
    layout: UILayout,
}

impl LostState {
    pub fn new() -> Self {
        let mut layout = UILayout::new();
        layout.begin(UIAnchor::Center, Vec2::new(0.0, 40.0));
        layout.push_text("Relive", 40.0, Color::RED.with_alpha(0.0));
        layout.push_text("Give up", 40.0, Color::GREEN.with_alpha(0.0));
        layout.end();

        Self {
            title: UIText::new(TITLE, 50.0, UIAnchor::TopCenter, Vec2::ZERO, Color::GREEN.with_alpha(0.0)),
            layout,
        }
    }
}

impl Default for LostState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for LostState {
    fn reset(&mut self) {
        self.title.color.a = 0.0;
        for text in &mut self.layout.texts {
            text.color.a = 0.0;
        }
    }

    fn process_input(&mut self, input: &dyn InputSource, bus: &mut EventBus) -> StateAction {
        match self.layout.update(input, bus) {
            Some(0) => StateAction::ChangeState(StateType::Level),
            Some(1) => StateAction::ChangeState(StateType::Menu),
            _ => StateAction::None,
        }
    }

    fn render(&mut self, renderer: &mut dyn Renderer, dt: f32) {
        self.title.render_animation(renderer, TextAnimation::FadeIn, TITLE_FADE, dt);
        self.layout.render_animation(renderer, TextAnimation::FadeIn, OPTIONS_FADE, dt);
    }
}
