//! Vertical option menus
//!
//! Texts are pushed inside `begin`/`end` blocks. Each block has an anchor and
//! a per-item offset: the first text of a block sits at the anchor, each
//! following one is shifted by the offset once more.

use super::text::{TextAnimation, UIAnchor, UIText};
use crate::audio::SoundType;
use crate::game::{EventBus, GameEvent};
use crate::input::{InputAction, InputSource};
use crate::math::{Color, Vec2};
use crate::render::Renderer;

#[derive(Debug, Clone, Default)]
pub struct UILayout {
    pub texts: Vec<UIText>,
    current_anchor: UIAnchor,
    extra_offset: Vec2,
    current_offset: Vec2,
    current_option: usize,
    pub is_active: bool,
}

impl UILayout {
    pub fn new() -> Self {
        Self {
            is_active: true,
            ..Default::default()
        }
    }

    pub fn begin(&mut self, anchor: UIAnchor, offset: Vec2) {
        self.current_anchor = anchor;
        self.extra_offset = offset;
    }

    pub fn end(&mut self) {
        self.extra_offset = Vec2::ZERO;
        self.current_offset = Vec2::ZERO;
    }

    /// Add a text at the current block position. Returns its option index.
    pub fn push_text(&mut self, string: impl Into<String>, font_size: f32, color: Color) -> usize {
        self.texts.push(UIText::new(string, font_size, self.current_anchor, self.current_offset, color));
        self.current_offset += self.extra_offset;
        self.texts.len() - 1
    }

    pub fn current_option(&self) -> usize {
        self.current_option
    }

    pub fn set_current_option(&mut self, option: usize) {
        self.current_option = if self.texts.is_empty() { 0 } else { option % self.texts.len() };
    }

    pub fn text_mut(&mut self, option: usize) -> Option<&mut UIText> {
        self.texts.get_mut(option)
    }

    /// Move the cursor with wraparound and report the accepted option.
    /// Navigation and acceptance queue their UI sounds on `bus`.
    pub fn update(&mut self, input: &dyn InputSource, bus: &mut EventBus) -> Option<usize> {
        let count = self.texts.len();
        if count == 0 || !self.is_active {
            return None;
        }

        if input.action_pressed(InputAction::NavigateUp) {
            self.current_option = (self.current_option + count - 1) % count;
            bus.send(GameEvent::SoundPlayed(SoundType::UiNavigate));
        } else if input.action_pressed(InputAction::NavigateDown) {
            self.current_option = (self.current_option + 1) % count;
            bus.send(GameEvent::SoundPlayed(SoundType::UiNavigate));
        }

        if input.action_pressed(InputAction::Accept) {
            bus.send(GameEvent::SoundPlayed(SoundType::UiClick));
            return Some(self.current_option);
        }
        None
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        if !self.is_active {
            return;
        }
        for text in &self.texts {
            text.render(renderer);
        }
        self.render_cursor(renderer);
    }

    pub fn render_animation(&mut self, renderer: &mut dyn Renderer, animation: TextAnimation, duration: f32, dt: f32) {
        if !self.is_active {
            return;
        }
        for text in &mut self.texts {
            text.render_animation(renderer, animation, duration, dt);
        }
        self.render_cursor(renderer);
    }

    /// ">" one font size to the left of the selected option
    fn render_cursor(&self, renderer: &mut dyn Renderer) {
        let Some(text) = self.texts.get(self.current_option) else { return };
        let position = text.position(renderer) - Vec2::new(text.font_size, 0.0);
        renderer.draw_text(">", position, text.font_size, text.color);
    }
}
