use crossterm::event::KeyCode;

use stankade::assets::{Assets, Sprite};
use stankade::config::{BongConfig, StankConfig, SurfaceConfig};
use stankade::games::stank::Heading;
use stankade::games::{BongGame, StankGame};
use stankade::geom::Cell;
use stankade::input::{self, InputEvent, InputSender};
use stankade::surface::DrawCommand;
use stankade::{Engine, GameState, Simulation};

fn stank_engine() -> (InputSender, Engine<StankGame>) {
    let sim = StankGame::with_seed(StankConfig::default(), 600, 400, 11).unwrap();
    let paths = sim.asset_paths();
    let (tx, port) = input::channel();
    let engine = Engine::new(SurfaceConfig::default(), sim, Box::new(port), Assets::pending(&paths)).unwrap();
    (tx, engine)
}

#[test]
fn keys_reach_the_game_through_the_port() {
    let (tx, mut engine) = stank_engine();
    engine.start();

    assert!(tx.send(InputEvent::Key(KeyCode::Left)));
    assert!(tx.send(InputEvent::Key(KeyCode::Up)));
    engine.pump_input();

    engine.tick(0.0);
    engine.tick(150.0);
    assert_eq!(engine.simulation().heading(), Heading::Up);
    assert_eq!(engine.simulation().skunk(), Cell::new(7, 9));
}

#[test]
fn cleanup_releases_input_and_stops_frames() {
    let (tx, mut engine) = stank_engine();
    engine.start();
    engine.cleanup();
    engine.cleanup();
    assert!(!engine.frame_pending());

    tx.send(InputEvent::Key(KeyCode::Down));
    engine.pump_input();
    engine.tick(1000.0);
    assert_eq!(engine.simulation().heading(), Heading::Right);
    assert_eq!(engine.simulation().skunk(), Cell::new(7, 10));
}

#[test]
fn ready_sprite_replaces_fallback_shape() {
    let (_tx, mut engine) = stank_engine();
    engine.start();
    engine.tick(0.0);
    let sprites = |e: &Engine<StankGame>| {
        e.canvas()
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
            .count()
    };
    assert_eq!(sprites(&engine), 0);

    engine.assets_mut().resolve("skunk.txt", Sprite::parse(">o"));
    engine.tick(16.0);
    assert_eq!(sprites(&engine), 1);
}

#[test]
fn finished_match_stops_scheduling() {
    let config = BongConfig {
        winning_score: 1,
        ..BongConfig::default()
    };
    let sim = BongGame::with_seed(config, 600, 400, 5).unwrap();
    let (_tx, port) = input::channel();
    let mut engine = Engine::new(SurfaceConfig::default(), sim, Box::new(port), Assets::pending::<&str>(&[])).unwrap();
    engine.start();

    let mut frame = 0u32;
    while engine.frame_pending() && frame < 20_000 {
        engine.tick(frame as f64 * 16.0);
        frame += 1;
    }

    assert_eq!(engine.state(), GameState::GameOver);
    assert!(!engine.frame_pending());
    assert!(engine.simulation().winner().is_some());
    assert!(engine.canvas().texts().any(|t| t.ends_with("WINS!")));
}

#[test]
fn restart_from_game_over_via_enter() {
    let config = BongConfig {
        winning_score: 1,
        ..BongConfig::default()
    };
    let sim = BongGame::with_seed(config, 600, 400, 9).unwrap();
    let (tx, port) = input::channel();
    let mut engine = Engine::new(SurfaceConfig::default(), sim, Box::new(port), Assets::pending::<&str>(&[])).unwrap();
    engine.start();
    let mut frame = 0u32;
    while engine.frame_pending() && frame < 20_000 {
        engine.tick(frame as f64 * 16.0);
        frame += 1;
    }
    assert_eq!(engine.state(), GameState::GameOver);

    tx.send(InputEvent::Key(KeyCode::Char('w')));
    engine.pump_input();
    assert_eq!(engine.state(), GameState::GameOver);

    tx.send(InputEvent::Key(KeyCode::Enter));
    engine.pump_input();
    assert_eq!(engine.state(), GameState::Running);
    assert!(engine.frame_pending());
    assert_eq!(engine.simulation().scores(), (0, 0));
}
