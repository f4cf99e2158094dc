//! End credits, shown once the last level group is finished

use std::fs;
use std::path::Path;

use super::{GameState, StateAction, StateType};
use crate::game::EventBus;
use crate::input::InputSource;
use crate::math::{Color, Vec2};
use crate::render::Renderer;
use crate::ui::{TextAnimation, UIAnchor, UILayout, UIText};

pub const DEFAULT_CREDITS: &[&str] = &[
    "Design & Programming",
    "Crossing The Line Team",
    "",
    "Music & Sound",
    "Crossing The Line Team",
];

const TITLE: &str = "Thanks for playing the game!";
const LINE_SIZE: f32 = 30.0;
/// Pixels per second
const SCROLL_SPEED: f32 = 40.0;
const TITLE_FADE: f32 = 1.0;
const BLINK_DURATION: f32 = 0.8;

/// One credit per line. Blank lines are kept as spacing.
pub fn load_credits(path: impl AsRef<Path>) -> Vec<String> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => text.lines().map(|l| l.trim_end().to_string()).collect(),
        Err(e) => {
            log::info!("No credits at {} ({}), using the built-in list", path.display(), e);
            DEFAULT_CREDITS.iter().map(|l| l.to_string()).collect()
        }
    }
}

pub struct CreditsState {
    title: UIText,
    lines: Vec<UIText>,
    layout: UILayout,
    scroll: f32,
}

impl CreditsState {
    pub fn new(credits: Vec<String>) -> Self {
        let lines = credits
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let offset = Vec2::new(0.0, i as f32 * LINE_SIZE * 1.5);
                UIText::new(line, LINE_SIZE, UIAnchor::BottomCenter, offset, Color::WHITE)
            })
            .collect();

        let mut layout = UILayout::new();
        layout.begin(UIAnchor::BottomRight, Vec2::new(0.0, 40.0));
        layout.push_text("Back To Menu", 40.0, Color::WHITE.with_alpha(0.0));
        layout.push_text("Quit", 40.0, Color::WHITE.with_alpha(0.0));
        layout.end();

        Self {
            title: UIText::new(TITLE, 70.0, UIAnchor::TopCenter, Vec2::ZERO, Color::WHITE.with_alpha(0.0)),
            lines,
            layout,
            scroll: 0.0,
        }
    }

    /// Move the credits up. Once the last line has left the screen they
    /// start again from the bottom.
    fn scroll(&mut self, screen_height: f32, dt: f32) {
        let total = self.lines.len() as f32 * LINE_SIZE * 1.5 + screen_height;
        self.scroll += SCROLL_SPEED * dt;
        if self.scroll > total {
            self.scroll = 0.0;
        }
    }
}

impl GameState for CreditsState {
    fn reset(&mut self) {
        self.scroll = 0.0;
        self.title.color.a = 0.0;
        for text in &mut self.layout.texts {
            text.color.a = 0.0;
        }
    }

    fn process_input(&mut self, input: &dyn InputSource, bus: &mut EventBus) -> StateAction {
        match self.layout.update(input, bus) {
            Some(0) => StateAction::ChangeState(StateType::Menu),
            Some(1) => StateAction::Quit,
            _ => StateAction::None,
        }
    }

    fn render(&mut self, renderer: &mut dyn Renderer, dt: f32) {
        self.scroll(renderer.screen_size().y, dt);

        for line in &self.lines {
            let mut shifted = line.clone();
            shifted.offset.y -= self.scroll;
            shifted.render(renderer);
        }

        self.title.render_animation(renderer, TextAnimation::FadeIn, TITLE_FADE, dt);
        self.layout.render_animation(renderer, TextAnimation::Blink, BLINK_DURATION, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::testing::ScriptedInput;
    use crate::input::InputAction;
    use crate::render::testing::RecordingRenderer;
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    #[test]
    fn test_load_credits_falls_back() {
        let dir = setup_test_dir();
        let path = dir.path().join("credits.txt");
        assert_eq!(load_credits(&path).len(), DEFAULT_CREDITS.len());

        fs::write(&path, "Someone\n\nSomeone else  \n").unwrap();
        assert_eq!(load_credits(&path), vec!["Someone", "", "Someone else"]);
    }

    #[test]
    fn test_options() {
        let mut credits = CreditsState::new(Vec::new());
        let mut bus = EventBus::new();
        let accept = ScriptedInput::pressing(&[InputAction::Accept]);

        assert_eq!(credits.process_input(&accept, &mut bus), StateAction::ChangeState(StateType::Menu));
        credits.process_input(&ScriptedInput::pressing(&[InputAction::NavigateDown]), &mut bus);
        assert_eq!(credits.process_input(&accept, &mut bus), StateAction::Quit);
    }

    #[test]
    fn test_lines_scroll_and_wrap() {
        let mut credits = CreditsState::new(vec!["A".to_string(), "B".to_string()]);
        let mut renderer = RecordingRenderer::new(800.0, 600.0);

        credits.render(&mut renderer, 1.0);
        assert_eq!(credits.scroll, SCROLL_SPEED);
        assert_eq!(&renderer.texts()[..3], &["A", "B", TITLE]);

        // 2 lines of 45px plus the screen
        credits.render(&mut renderer, 20.0);
        assert_eq!(credits.scroll, 0.0);

        credits.render(&mut renderer, 1.0);
        credits.reset();
        assert_eq!(credits.scroll, 0.0);
    }
}
