//! Crossing The Line game binary

use crossing_the_line::backend::MacroquadAssets;
use crossing_the_line::config::CONFIG_FILE;
use crossing_the_line::game::{GameEvent, GameEventKind};
use crossing_the_line::input::InputState;
use crossing_the_line::resources::{ResourceDatabase, RESOURCE_DIR};
use crossing_the_line::{App, GameConfig, VERSION};
use macroquad::prelude::*;

fn load_config() -> GameConfig {
    GameConfig::load(CONFIG_FILE).unwrap_or_else(|e| {
        log::error!("Failed to read '{}': {}, using defaults", CONFIG_FILE, e);
        GameConfig::default()
    })
}

fn window_conf() -> Conf {
    let config = load_config();
    Conf {
        window_title: format!("{} v{}", config.window_title, VERSION),
        window_width: config.window_width,
        window_height: config.window_height,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();

    let mut assets = MacroquadAssets::preload(RESOURCE_DIR).await;
    let resources = ResourceDatabase::init(&mut assets);
    let (mut renderer, mut audio) = assets.into_backends();

    let mut input = InputState::new();
    let mut app = App::new(&config, resources);

    app.bus_mut().listen(GameEventKind::StateChanged, |event| {
        if let GameEvent::StateChanged(to) = event {
            log::info!("Entering {:?}", to);
        }
        false
    });

    log::info!("=== Crossing The Line v{} ===", VERSION);

    while app.is_running() {
        let dt = get_frame_time();

        input.poll();
        app.update(&input, &mut audio, dt);

        clear_background(Color::new(0.1, 0.1, 0.1, 1.0));
        app.render(&mut renderer, dt);

        next_frame().await;
    }

    log::info!("Goodbye");
}
