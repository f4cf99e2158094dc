//! Level groups and progression
//!
//! Levels are grouped by chapter from their file names (`C<group>L<level>`).
//! Group 0 is the hub, which is where chapter points live. Standing on a
//! chapter point shows that chapter's progress; accepting starts its current
//! level unless the previous chapter still has keys missing.
//!
//! Progress is written to the save file as soon as it changes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::event::{EventBus, GameEvent};
use super::level::Level;
use crate::audio::SoundType;
use crate::config::GameConfig;
use crate::math::{Color, Vec2};
use crate::physics::Physics;
use crate::render::Renderer;
use crate::state::StateType;
use crate::ui::{TextAnimation, UIAnchor, UIText};
use crate::world::{LevelError, SaveData};

pub const LEVEL_GROUPS_MAX: usize = 4;
pub const LEVEL_EXTENSION: &str = "nklvl";

const GROUP_NAMES: [&str; LEVEL_GROUPS_MAX] = ["Hub", "Chapter 1", "Chapter 2", "Chapter 3"];

const HUD_FONT_SIZE: f32 = 30.0;
const HUD_FADE_DURATION: f32 = 0.2;
const START_PROMPT: &str = "Press [ENTER] To Start";
const LOCKED_PROMPT: &str = "Locked";

/// Group and level numbers from a `C<g>L<l>.nklvl` file name
pub fn parse_level_name(file_name: &str) -> Option<(usize, usize)> {
    let stem = file_name.strip_suffix(LEVEL_EXTENSION)?.strip_suffix('.')?;
    let rest = stem.strip_prefix('C')?;
    let (group, level) = rest.split_once('L')?;
    Some((group.parse().ok()?, level.parse().ok()?))
}

/// Level paths per group, each group ordered by level number.
/// Names that don't follow the convention are skipped.
pub fn discover_levels<P: AsRef<Path>>(dir: P) -> io::Result<Vec<Vec<PathBuf>>> {
    let dir = dir.as_ref();
    let mut found: Vec<Vec<(usize, PathBuf)>> = vec![Vec::new(); LEVEL_GROUPS_MAX];

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };

        match parse_level_name(name) {
            Some((group, level)) if group < LEVEL_GROUPS_MAX => found[group].push((level, path)),
            Some((group, _)) => log::warn!("Skipping '{}': group {} out of range", name, group),
            None => log::debug!("Skipping '{}' in levels directory", name),
        }
    }

    Ok(found
        .into_iter()
        .map(|mut group| {
            group.sort_by_key(|(level, _)| *level);
            group.into_iter().map(|(_, path)| path).collect()
        })
        .collect())
}

#[derive(Debug, Clone, Default)]
pub struct LevelGroup {
    pub name: String,
    pub levels: Vec<PathBuf>,
    pub current_level: usize,
    pub coins_collected: usize,
}

impl LevelGroup {
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_complete(&self) -> bool {
        self.coins_collected >= self.levels.len()
    }
}

/// Where `advance` went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Level(PathBuf),
    Hub,
    Credits,
}

impl Transition {
    pub fn state(&self) -> StateType {
        match self {
            Transition::Level(_) => StateType::Level,
            Transition::Hub => StateType::Hub,
            Transition::Credits => StateType::Credits,
        }
    }
}

pub struct LevelManager {
    level: Level,
    groups: Vec<LevelGroup>,
    current_group: usize,
    hub_path: PathBuf,
    save: SaveData,

    /// Group whose chapter point the player is standing on
    hud_group: Option<usize>,
    hud_visible: bool,
    texts: [UIText; 4],
}

impl LevelManager {
    pub fn new(config: &GameConfig, level: Level, save: SaveData) -> Self {
        let paths = discover_levels(&config.levels_dir).unwrap_or_else(|e| {
            log::warn!("Could not read levels from '{}': {}", config.levels_dir.display(), e);
            vec![Vec::new(); LEVEL_GROUPS_MAX]
        });

        let groups: Vec<LevelGroup> = paths
            .into_iter()
            .zip(GROUP_NAMES)
            .map(|(levels, name)| LevelGroup {
                name: name.to_string(),
                levels,
                ..Default::default()
            })
            .collect();
        for group in &groups {
            log::debug!("{}: {} levels", group.name, group.level_count());
        }

        let hidden = Color::WHITE.with_alpha(0.0);
        let text = |string: &str, y: f32, color: Color| {
            UIText::new(string, HUD_FONT_SIZE, UIAnchor::TopCenter, Vec2::new(0.0, y), color)
        };
        let texts = [
            text("GROUP NAME", 0.0, hidden),
            text("LEVELS COUNT", 35.0, hidden),
            text("KEYS COLLECTED COUNT", 65.0, hidden),
            text(START_PROMPT, 100.0, Color::GREEN.with_alpha(0.0)),
        ];

        let mut manager = Self {
            level,
            groups,
            current_group: 1,
            hub_path: config.hub_level.clone(),
            save,
            hud_group: None,
            hud_visible: false,
            texts,
        };
        manager.restore_progress();
        manager
    }

    /// Groups before the saved one are finished; the saved one gets the
    /// saved coin count.
    fn restore_progress(&mut self) {
        let (saved_group, saved_coins) = self.save.level_data();
        let saved_group = saved_group as usize;

        for group in self.groups.iter_mut().take(saved_group.min(LEVEL_GROUPS_MAX)).skip(1) {
            group.coins_collected = group.level_count();
            group.current_level = group.level_count();
        }

        self.current_group = saved_group.clamp(1, LEVEL_GROUPS_MAX - 1);
        if saved_group < LEVEL_GROUPS_MAX {
            let group = &mut self.groups[self.current_group];
            group.coins_collected = (saved_coins as usize).min(group.level_count());
        }

        log::info!("Progress restored: group {}, {} coins", saved_group, saved_coins);
    }

    /// Load the hub level.
    pub fn init(&mut self, physics: &mut dyn Physics) -> Result<(), LevelError> {
        self.level.load(&self.hub_path, physics)
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn groups(&self) -> &[LevelGroup] {
        &self.groups
    }

    pub fn current_group(&self) -> usize {
        self.current_group
    }

    pub fn save_data(&self) -> &SaveData {
        &self.save
    }

    pub fn save_data_mut(&mut self) -> &mut SaveData {
        &mut self.save
    }

    /// A chapter is playable once the one before it has all its keys.
    /// The hub and the first chapter are always open.
    pub fn is_unlocked(&self, group: usize) -> bool {
        if group >= self.groups.len() {
            return false;
        }
        group <= 1 || self.groups[group - 1].is_complete()
    }

    // =========================================================================
    // Progression
    // =========================================================================

    /// Go to the next level of the current group. Past its last level the
    /// player returns to the hub, or to the credits after the final group.
    pub fn advance(&mut self, physics: &mut dyn Physics, bus: &mut EventBus) -> Result<Transition, LevelError> {
        let g = self.current_group;
        let next = self.groups[g].current_level + 1;

        // The group only moves on once the next level is in place
        let transition = if let Some(path) = self.groups[g].levels.get(next).cloned() {
            self.level.load(&path, physics)?;
            self.groups[g].current_level = next;
            Transition::Level(path)
        } else {
            self.level.load(&self.hub_path, physics)?;

            let group = &mut self.groups[g];
            group.current_level = group.level_count();
            if group.is_complete() && g + 1 < LEVEL_GROUPS_MAX {
                self.persist((g + 1) as u8, 0);
            }

            let is_last = self.groups[g + 1..].iter().all(|next| next.levels.is_empty());
            if is_last {
                Transition::Credits
            } else {
                Transition::Hub
            }
        };

        log::info!("Advanced from {} to {:?}", self.groups[g].name, transition);
        bus.send(GameEvent::StateChanged(transition.state()));
        Ok(transition)
    }

    /// Start the level of the chapter the player stands on. Returns false and
    /// queues the fail sound when there's nothing to start.
    pub fn enter_chapter(&mut self, physics: &mut dyn Physics, bus: &mut EventBus) -> Result<bool, LevelError> {
        let Some(g) = self.hud_group else {
            return Ok(false);
        };
        if !self.is_unlocked(g) || self.groups[g].levels.is_empty() {
            log::debug!("{} is locked", self.groups[g].name);
            bus.send(GameEvent::SoundPlayed(SoundType::FailInput));
            return Ok(false);
        }

        let group = &mut self.groups[g];
        if group.current_level >= group.level_count() {
            group.current_level = 0;
        }
        let path = group.levels[group.current_level].clone();

        self.level.load(&path, physics)?;
        self.current_group = g;
        self.hud_group = None;
        self.hud_visible = false;
        bus.send(GameEvent::StateChanged(StateType::Level));
        Ok(true)
    }

    pub fn on_coin_collected(&mut self) {
        let g = self.current_group;
        let group = &mut self.groups[g];
        group.coins_collected = (group.coins_collected + 1).min(group.level_count());
        let coins = group.coins_collected as u8;

        // Replays of finished groups don't touch the saved frontier
        if g as u8 >= self.save.current_group {
            self.persist(g as u8, coins);
        }
    }

    fn persist(&mut self, group: u8, coins: u8) {
        if let Err(e) = self.save.set_level_data(group, coins) {
            log::error!("Failed to save progress: {}", e);
        }
    }

    /// React to a routed event. Returns true when it was used.
    pub fn handle_event(&mut self, event: &GameEvent, physics: &mut dyn Physics) -> bool {
        match *event {
            GameEvent::ChapterEntered { chapter, .. } => self.show_chapter(chapter as usize),
            GameEvent::ChapterExited { .. } => {
                self.hud_group = None;
                self.hud_visible = false;
                true
            }
            GameEvent::CoinCollected => {
                self.on_coin_collected();
                true
            }
            GameEvent::StateChanged(StateType::Level) => {
                self.level.reset(physics);
                true
            }
            GameEvent::StateChanged(StateType::Hub) => {
                if self.level.is_loaded() && self.level.nkbin.path == self.hub_path {
                    self.level.reset(physics);
                } else if let Err(e) = self.init(physics) {
                    log::error!("Failed to load the hub: {}", e);
                }
                self.hud_group = None;
                self.hud_visible = false;
                true
            }
            _ => false,
        }
    }

    fn show_chapter(&mut self, g: usize) -> bool {
        let Some(group) = self.groups.get(g) else {
            log::warn!("Chapter point for unknown group {}", g);
            return false;
        };

        let count = group.level_count();
        self.texts[0].set_string(group.name.clone());
        self.texts[1].set_string(format!("{}/{}", group.current_level.min(count), count));
        self.texts[2].set_string(format!("Keys: {}/{}", group.coins_collected, count));

        let unlocked = self.is_unlocked(g);
        self.texts[3].set_string(if unlocked { START_PROMPT } else { LOCKED_PROMPT });

        self.hud_group = Some(g);
        self.hud_visible = true;
        true
    }

    pub fn hud_visible(&self) -> bool {
        self.hud_visible
    }

    pub fn hud_texts(&self) -> &[UIText] {
        &self.texts
    }

    // =========================================================================
    // Frame
    // =========================================================================

    pub fn render(&self, physics: &dyn Physics, renderer: &mut dyn Renderer) {
        self.level.render(physics, renderer);
    }

    pub fn render_hud(&mut self, renderer: &mut dyn Renderer, dt: f32) {
        self.level.render_hud(renderer);

        let animation = if self.hud_visible { TextAnimation::FadeIn } else { TextAnimation::FadeOut };
        for text in &mut self.texts {
            text.render_animation(renderer, animation, HUD_FADE_DURATION, dt);
        }
    }
}
