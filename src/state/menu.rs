//! Main menu and the volume settings page

use super::{GameState, StateAction, StateType};
use crate::audio::SoundType;
use crate::game::{EventBus, GameEvent};
use crate::input::{InputAction, InputSource};
use crate::math::{Color, Vec2};
use crate::render::Renderer;
use crate::ui::{TextAnimation, UIAnchor, UILayout, UIText};

pub const TITLE: &str = "Crossing The Line";
const SETTINGS_TITLE: &str = "Settings";

const VOLUME_STEP: i32 = 10;
const FADE_DURATION: f32 = 0.8;

const OPTION_START: usize = 0;
const OPTION_SETTINGS: usize = 1;
const OPTION_QUIT: usize = 2;

const SETTING_MASTER: usize = 0;
const SETTING_MUSIC: usize = 1;
const SETTING_SFX: usize = 2;
const SETTING_APPLY: usize = 3;
const SETTING_BACK: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Main,
    Settings,
}

/// Volumes are edited as whole percentages.
pub struct MenuState {
    title: UIText,
    main: UILayout,
    settings: UILayout,
    page: Page,
    volumes: [i32; 3],
}

fn volume_label(setting: usize, value: i32) -> String {
    let name = match setting {
        SETTING_MASTER => "Master",
        SETTING_MUSIC => "Music",
        _ => "SFX",
    };
    format!("{} Volume: {}", name, value)
}

impl MenuState {
    pub fn new(volumes: (f32, f32, f32)) -> Self {
        let hidden = Color::WHITE.with_alpha(0.0);
        let percent = |v: f32| (v * 100.0).round() as i32;
        let volumes = [percent(volumes.0), percent(volumes.1), percent(volumes.2)];

        let mut main = UILayout::new();
        main.begin(UIAnchor::Center, Vec2::new(0.0, 40.0));
        main.push_text("Start", 40.0, hidden);
        main.push_text("Settings", 40.0, hidden);
        main.push_text("Quit", 40.0, hidden);
        main.end();

        let mut settings = UILayout::new();
        settings.begin(UIAnchor::Center, Vec2::new(0.0, 40.0));
        for (setting, value) in volumes.iter().enumerate() {
            settings.push_text(volume_label(setting, *value), 40.0, Color::WHITE);
        }
        settings.end();
        settings.begin(UIAnchor::BottomCenter, Vec2::new(0.0, 40.0));
        settings.push_text("Apply Changes", 40.0, Color::WHITE);
        settings.push_text("Back To Menu", 40.0, Color::WHITE);
        settings.end();

        Self {
            title: UIText::new(TITLE, 70.0, UIAnchor::TopCenter, Vec2::ZERO, hidden),
            main,
            settings,
            page: Page::Main,
            volumes,
        }
    }

    pub fn volumes(&self) -> [i32; 3] {
        self.volumes
    }

    fn show_page(&mut self, page: Page) {
        self.page = page;
        self.title.set_string(match page {
            Page::Main => TITLE,
            Page::Settings => SETTINGS_TITLE,
        });
        if page == Page::Main {
            self.reset();
        }
    }

    fn step_volume(&mut self, input: &dyn InputSource, bus: &mut EventBus) {
        let step = if input.action_pressed(InputAction::NavigateLeft) {
            -VOLUME_STEP
        } else if input.action_pressed(InputAction::NavigateRight) {
            VOLUME_STEP
        } else {
            return;
        };
        bus.send(GameEvent::SoundPlayed(SoundType::UiNavigate));

        let setting = self.settings.current_option();
        if setting > SETTING_SFX {
            return;
        }
        let value = (self.volumes[setting] + step).clamp(0, 100);
        self.volumes[setting] = value;
        if let Some(text) = self.settings.text_mut(setting) {
            text.set_string(volume_label(setting, value));
        }
    }
}

impl GameState for MenuState {
    fn reset(&mut self) {
        self.title.color.a = 0.0;
        for text in &mut self.main.texts {
            text.color.a = 0.0;
        }
    }

    fn on_enter(&mut self, bus: &mut EventBus) {
        self.show_page(Page::Main);
        bus.send(GameEvent::MusicPlayed(SoundType::Hub));
    }

    fn process_input(&mut self, input: &dyn InputSource, bus: &mut EventBus) -> StateAction {
        match self.page {
            Page::Main => match self.main.update(input, bus) {
                Some(OPTION_START) => StateAction::ChangeState(StateType::Hub),
                Some(OPTION_SETTINGS) => {
                    self.show_page(Page::Settings);
                    StateAction::None
                }
                Some(OPTION_QUIT) => StateAction::Quit,
                _ => StateAction::None,
            },
            Page::Settings => {
                let clicked = self.settings.update(input, bus);
                self.step_volume(input, bus);

                match clicked {
                    Some(SETTING_APPLY) => {
                        let [master, music, sfx] = self.volumes.map(|v| v as f32 / 100.0);
                        StateAction::ApplyVolume { master, music, sfx }
                    }
                    Some(SETTING_BACK) => {
                        self.show_page(Page::Main);
                        StateAction::None
                    }
                    _ => StateAction::None,
                }
            }
        }
    }

    fn render(&mut self, renderer: &mut dyn Renderer, dt: f32) {
        self.title.render_animation(renderer, TextAnimation::FadeIn, FADE_DURATION, dt);
        let layout = match self.page {
            Page::Main => &mut self.main,
            Page::Settings => &mut self.settings,
        };
        layout.render_animation(renderer, TextAnimation::FadeIn, FADE_DURATION, dt);
    }
}
