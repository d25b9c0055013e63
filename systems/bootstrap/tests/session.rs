use std::{collections::BTreeMap, path::PathBuf};

use bubble_arena_core::{
    CellCoord, Command, Event, InputSnapshot, ItemKind, PlayerAction, PlayerId,
};
use bubble_arena_system_bootstrap::{
    load_level, Bootstrap, BootstrapError, GameConfig, LevelError,
};
use bubble_arena_world::{query, LevelLayout, LevelTag};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn ten_hertz() -> GameConfig {
    GameConfig {
        tick_rate_hz: 10,
        ..GameConfig::default()
    }
}

fn spawn(player: PlayerId, row: u32, column: u32) -> Command {
    Command::SpawnPlayer {
        player,
        cell: CellCoord::new(row, column),
    }
}

#[test]
fn owner_standing_on_its_bubble_gets_trapped() {
    let mut session = Bootstrap::new(ten_hertz()).session().expect("session");
    let player = PlayerId::new(1);
    let _ = session.submit(spawn(player, 7, 7));

    let mut inputs = BTreeMap::new();
    let _ = inputs.insert(
        player,
        InputSnapshot::new(Vec::new(), vec![PlayerAction::DropBubble]),
    );
    let events = session.step(&inputs);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::BubblePlaced { .. })));

    let idle = BTreeMap::new();
    let mut trapped_at = None;
    for step in 1..=31 {
        let events = session.step(&idle);
        if events.contains(&Event::PlayerTrapped { player }) {
            trapped_at = Some(step);
            break;
        }
    }
    assert_eq!(trapped_at, Some(30), "fuse burns for thirty 100 ms ticks");

    let view = query::player_view(session.world());
    let snapshot = view.get(player).expect("player");
    assert!(snapshot.trapped);
    assert_eq!(snapshot.num_bubbles, 1);
}

#[test]
fn standing_on_an_item_collects_it() {
    let layout = LevelLayout::empty(15).with_tag(
        CellCoord::new(2, 2),
        LevelTag::Item {
            kind: ItemKind::Needle,
        },
    );
    let mut session = Bootstrap::new(ten_hertz())
        .session_with_layout(&layout)
        .expect("session");
    let player = PlayerId::new(4);
    let _ = session.submit(spawn(player, 2, 2));

    let events = session.step(&BTreeMap::new());
    assert!(events.contains(&Event::ItemAcquired {
        player,
        cell: CellCoord::new(2, 2),
        kind: ItemKind::Needle,
    }));
    assert!(query::item_view(session.world()).at(CellCoord::new(2, 2)).is_none());
}

#[test]
fn removed_players_stop_receiving_commands() {
    let mut session = Bootstrap::default().session().expect("session");
    let player = PlayerId::new(2);
    let _ = session.submit(spawn(player, 0, 0));
    let _ = session.step(&BTreeMap::new());
    let _ = session.submit(Command::RemovePlayer { player });

    let mut inputs = BTreeMap::new();
    let _ = inputs.insert(
        player,
        InputSnapshot::new(Vec::new(), vec![PlayerAction::DropBubble]),
    );
    let events = session.step(&inputs);
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::TimeAdvanced { .. })));
}

#[test]
fn unknown_level_aborts_bootstrap() {
    let config = GameConfig {
        level_dir: PathBuf::from("no/such/levels"),
        level: Some("missing".to_owned()),
        ..GameConfig::default()
    };
    let error = Bootstrap::new(config).session().expect_err("missing level");
    assert!(matches!(
        error,
        BootstrapError::Level(LevelError::NotFound { .. })
    ));
}

#[test]
fn bundled_level_and_config_load() {
    let root = repo_root();
    let config = GameConfig::load(Some(&root.join("bubble-arena.toml"))).expect("config");
    let layout = load_level(&root.join("levels"), "arena").expect("level");
    assert_eq!(layout.size(), config.grid_size);

    let session = Bootstrap::new(config)
        .session_with_layout(&layout)
        .expect("session");
    assert!(!query::obstacles(session.world()).is_empty());
}
