//! Anchored screen text
//!
//! A text stores where it wants to be (anchor plus offset), not where it is.
//! The pixel position is worked out at draw time from the current screen and
//! measured text sizes, so window resizes need no bookkeeping.

use crate::math::{Color, Vec2};
use crate::render::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UIAnchor {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,

    CenterLeft,
    Center,
    CenterRight,

    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnimation {
    FadeIn,
    FadeOut,
    /// Fade in and out forever
    Blink,
}

/// Top-left pixel position of a `text_size` box anchored on a `screen`.
/// Padding is 10 pixels horizontally and one line vertically.
pub fn compute_position(anchor: UIAnchor, offset: Vec2, screen: Vec2, text_size: Vec2, font_size: f32) -> Vec2 {
    let padding = Vec2::new(10.0, font_size);
    let screen_center = screen / 2.0;
    let text_center = text_size / 2.0;

    let left = padding.x;
    let center_x = screen_center.x - text_center.x;
    let right = screen.x - text_size.x - padding.x;

    let top = padding.y;
    let center_y = screen_center.y - text_center.y;
    let bottom = screen.y - text_size.y - padding.y;

    let base = match anchor {
        UIAnchor::TopLeft => Vec2::new(left, top),
        UIAnchor::TopCenter => Vec2::new(center_x, top),
        UIAnchor::TopRight => Vec2::new(right, top),
        UIAnchor::CenterLeft => Vec2::new(left, center_y),
        UIAnchor::Center => Vec2::new(center_x, center_y),
        UIAnchor::CenterRight => Vec2::new(right, center_y),
        UIAnchor::BottomLeft => Vec2::new(left, bottom),
        UIAnchor::BottomCenter => Vec2::new(center_x, bottom),
        UIAnchor::BottomRight => Vec2::new(right, bottom),
    };
    base + offset
}

#[derive(Debug, Clone, PartialEq)]
pub struct UIText {
    pub string: String,
    pub font_size: f32,
    pub anchor: UIAnchor,
    pub offset: Vec2,
    pub color: Color,
    pub is_active: bool,
    /// Alpha direction for blinking, +1 or -1
    blink_dir: f32,
}

impl UIText {
    pub fn new(string: impl Into<String>, font_size: f32, anchor: UIAnchor, offset: Vec2, color: Color) -> Self {
        Self {
            string: string.into(),
            font_size,
            anchor,
            offset,
            color,
            is_active: true,
            blink_dir: 1.0,
        }
    }

    pub fn set_string(&mut self, string: impl Into<String>) {
        self.string = string.into();
    }

    pub fn set_anchor(&mut self, anchor: UIAnchor) {
        self.anchor = anchor;
    }

    /// Pixel position on the renderer's current screen
    pub fn position(&self, renderer: &dyn Renderer) -> Vec2 {
        let size = renderer.measure_text(&self.string, self.font_size);
        compute_position(self.anchor, self.offset, renderer.screen_size(), size, self.font_size)
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        if !self.is_active {
            return;
        }
        let position = self.position(renderer);
        renderer.draw_text(&self.string, position, self.font_size, self.color);
    }

    /// Step the animation. `duration` is the time a full fade takes.
    pub fn animate(&mut self, animation: TextAnimation, duration: f32, dt: f32) {
        let step = if duration > 0.0 { dt / duration } else { 1.0 };

        match animation {
            TextAnimation::FadeIn => self.color.a += step,
            TextAnimation::FadeOut => self.color.a -= step,
            TextAnimation::Blink => {
                if self.color.a >= 1.0 {
                    self.blink_dir = -1.0;
                } else if self.color.a <= 0.0 {
                    self.blink_dir = 1.0;
                }
                self.color.a += self.blink_dir * step;
            }
        }
        self.color.a = self.color.a.clamp(0.0, 1.0);
    }

    pub fn render_animation(&mut self, renderer: &mut dyn Renderer, animation: TextAnimation, duration: f32, dt: f32) {
        if !self.is_active {
            return;
        }
        self.animate(animation, duration, dt);
        self.render(renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Vec2 = Vec2::new(1366.0, 720.0);
    const TEXT: Vec2 = Vec2::new(200.0, 30.0);

    #[test]
    fn test_anchor_positions() {
        let at = |anchor| compute_position(anchor, Vec2::ZERO, SCREEN, TEXT, 30.0);

        assert_eq!(at(UIAnchor::TopLeft), Vec2::new(10.0, 30.0));
        assert_eq!(at(UIAnchor::TopCenter), Vec2::new(583.0, 30.0));
        assert_eq!(at(UIAnchor::TopRight), Vec2::new(1156.0, 30.0));
        assert_eq!(at(UIAnchor::Center), Vec2::new(583.0, 345.0));
        assert_eq!(at(UIAnchor::BottomLeft), Vec2::new(10.0, 660.0));
        assert_eq!(at(UIAnchor::BottomRight), Vec2::new(1156.0, 660.0));
    }

    #[test]
    fn test_offset_is_added() {
        let pos = compute_position(UIAnchor::Center, Vec2::new(0.0, 40.0), SCREEN, TEXT, 30.0);
        assert_eq!(pos, Vec2::new(583.0, 385.0));
    }

    #[test]
    fn test_fade_clamps() {
        let mut text = UIText::new("hi", 30.0, UIAnchor::Center, Vec2::ZERO, Color::WHITE.with_alpha(0.0));

        text.animate(TextAnimation::FadeIn, 1.0, 0.6);
        assert!((text.color.a - 0.6).abs() < 1e-6);
        text.animate(TextAnimation::FadeIn, 1.0, 0.6);
        assert_eq!(text.color.a, 1.0);
        text.animate(TextAnimation::FadeOut, 0.5, 1.0);
        assert_eq!(text.color.a, 0.0);
    }

    #[test]
    fn test_blink_turns_around() {
        let mut text = UIText::new("blink", 30.0, UIAnchor::Center, Vec2::ZERO, Color::WHITE);

        text.animate(TextAnimation::Blink, 1.0, 0.25);
        assert!((text.color.a - 0.75).abs() < 1e-6);
        for _ in 0..3 {
            text.animate(TextAnimation::Blink, 1.0, 0.25);
        }
        assert_eq!(text.color.a, 0.0);
        text.animate(TextAnimation::Blink, 1.0, 0.25);
        assert!((text.color.a - 0.25).abs() < 1e-6);
    }
}
