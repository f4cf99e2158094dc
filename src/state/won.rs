//! Shown after a level is won. Each visit reads the next line of the
//! dialogue script.

use super::{GameState, StateAction};
use crate::dialogue::Dialogue;
use crate::game::EventBus;
use crate::input::InputSource;
use crate::math::{Color, Vec2};
use crate::render::Renderer;
use crate::ui::{TextAnimation, UIAnchor, UILayout, UIText};

const TITLE_COLOR: Color = Color::new(0.6, 0.6, 0.0, 0.0);
const FADE_DURATION: f32 = 1.5;

pub struct WonState {
    title: UIText,
    layout: UILayout,
    dialogue: Dialogue,
}

impl WonState {
    pub fn new(dialogue: Dialogue) -> Self {
        let mut layout = UILayout::new();
        layout.begin(UIAnchor::Center, Vec2::ZERO);
        layout.push_text("Continue", 40.0, Color::RED.with_alpha(0.0));
        layout.end();

        Self {
            title: UIText::new("", 50.0, UIAnchor::TopLeft, Vec2::ZERO, TITLE_COLOR),
            layout,
            dialogue,
        }
    }
}

impl GameState for WonState {
    fn reset(&mut self) {
        self.title.color.a = 0.0;
        for text in &mut self.layout.texts {
            text.color.a = 0.0;
        }
    }

    fn on_enter(&mut self, _bus: &mut EventBus) {
        if let Some(line) = self.dialogue.advance() {
            self.title.set_string(line);
        }
    }

    fn process_input(&mut self, input: &dyn InputSource, bus: &mut EventBus) -> StateAction {
        match self.layout.update(input, bus) {
            Some(0) => StateAction::Advance,
            _ => StateAction::None,
        }
    }

    fn render(&mut self, renderer: &mut dyn Renderer, dt: f32) {
        self.title.render_animation(renderer, TextAnimation::FadeIn, FADE_DURATION, dt);
        self.layout.render_animation(renderer, TextAnimation::FadeIn, FADE_DURATION, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::testing::ScriptedInput;
    use crate::input::InputAction;

    #[test]
    fn test_each_entry_shows_next_line() {
        let mut won = WonState::new(Dialogue::parse("First;\nSecond;\n"));
        let mut bus = EventBus::new();

        won.on_enter(&mut bus);
        assert_eq!(won.title.string, "First");
        won.on_enter(&mut bus);
        assert_eq!(won.title.string, "Second");
        won.on_enter(&mut bus);
        assert_eq!(won.title.string, "Second");
    }

    #[test]
    fn test_continue_advances() {
        let mut won = WonState::new(Dialogue::default());
        let mut bus = EventBus::new();
        assert_eq!(won.process_input(&ScriptedInput::default(), &mut bus), StateAction::None);

        let action = won.process_input(&ScriptedInput::pressing(&[InputAction::Accept]), &mut bus);
        assert_eq!(action, StateAction::Advance);
    }
}
