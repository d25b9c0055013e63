use std::time::Duration;

use bubble_arena_core::{
    CellCoord, Command, Event, ExplosionDirection, ItemKind, PlayerId, FUSE_DURATION,
};
use bubble_arena_world::{apply, query, DropTable, LevelLayout, LevelTag, World, WorldConfig};
use glam::Vec2;

fn world_with(layout: LevelLayout) -> World {
    let config = WorldConfig {
        drop_table: DropTable::never(),
        ..WorldConfig::default()
    };
    World::new(config, &layout).expect("world")
}

fn run(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        apply(world, command, &mut events);
    }
    events
}

fn tick(ms: u64) -> Command {
    Command::Tick {
        dt: Duration::from_millis(ms),
    }
}

fn spawn(player: PlayerId, row: u32, column: u32) -> Command {
    Command::SpawnPlayer {
        player,
        cell: CellCoord::new(row, column),
    }
}

fn teleport(world: &mut World, player: PlayerId, row: u32, column: u32) {
    let _ = run(
        world,
        [Command::SyncPlayerPosition {
            player,
            position: Vec2::new(column as f32 * 80.0, row as f32 * 80.0),
        }],
    );
}

fn num_bubbles(world: &World, player: PlayerId) -> u32 {
    query::player_view(world)
        .get(player)
        .map(|snapshot| snapshot.num_bubbles)
        .expect("player present")
}

#[test]
fn centred_bubble_blasts_a_plus_then_clears() {
    let mut world = world_with(LevelLayout::empty(15));
    let player = PlayerId::new(1);
    let _ = run(
        &mut world,
        [spawn(player, 7, 7), Command::DropBubble { player }],
    );

    let _ = run(&mut world, [tick(2999)]);
    assert!(query::explosion_view(&world).is_empty());
    assert!(query::has_bubble(&world, CellCoord::new(7, 7)));

    let events = run(&mut world, [tick(1)]);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::ExplosionGroupSpawned { cell_count: 29, .. }
    )));

    let view = query::explosion_view(&world);
    assert_eq!(view.len(), 29);
    for snapshot in view.iter() {
        let cell = snapshot.cell;
        assert!(cell.row() == 7 || cell.column() == 7);
        if cell == CellCoord::new(7, 7) {
            assert_eq!(snapshot.direction, ExplosionDirection::Center);
        }
    }
    assert!(!query::has_bubble(&world, CellCoord::new(7, 7)));
    assert_eq!(num_bubbles(&world, player), 1);

    let _ = run(&mut world, [tick(499)]);
    assert_eq!(query::explosion_view(&world).len(), 29);
    let events = run(&mut world, [tick(1)]);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ExplosionGroupExpired { .. })));
    assert!(query::explosion_view(&world).is_empty());
}

#[test]
fn detonation_refunds_every_bubble_in_the_group() {
    let layout = LevelLayout::empty(15)
        .with_tag(CellCoord::new(9, 0), LevelTag::Item { kind: ItemKind::Bubble })
        .with_tag(CellCoord::new(9, 1), LevelTag::Item { kind: ItemKind::Bubble });
    let mut world = world_with(layout);
    let player = PlayerId::new(1);
    let _ = run(
        &mut world,
        [
            spawn(player, 2, 2),
            Command::PickUpItem {
                player,
                cell: CellCoord::new(9, 0),
            },
            Command::PickUpItem {
                player,
                cell: CellCoord::new(9, 1),
            },
        ],
    );
    assert_eq!(num_bubbles(&world, player), 3);

    for column in [2, 4, 6] {
        teleport(&mut world, player, 2, column);
        let events = run(&mut world, [Command::DropBubble { player }]);
        assert!(matches!(events[..], [Event::BubblePlaced { .. }, ..]));
    }
    assert_eq!(num_bubbles(&world, player), 0);
    assert_eq!(query::bubble_group_view(&world).len(), 1);

    let events = run(&mut world, [Command::Tick { dt: FUSE_DURATION }]);
    assert!(events.contains(&Event::BubblesRefunded { player, count: 3 }));
    assert_eq!(num_bubbles(&world, player), 3);
}

#[test]
fn indirectly_connected_bubbles_share_one_fuse() {
    let mut world = world_with(LevelLayout::empty(15));
    let a = PlayerId::new(1);
    let b = PlayerId::new(2);
    let c = PlayerId::new(3);
    let _ = run(&mut world, [spawn(a, 5, 1), spawn(b, 5, 8), spawn(c, 5, 13)]);

    // Range 7: A reaches B (7 apart), B reaches C (5 apart), A never reaches C.
    let events = run(
        &mut world,
        [
            Command::DropBubble { player: a },
            tick(100),
            Command::DropBubble { player: c },
            tick(100),
            Command::DropBubble { player: b },
        ],
    );

    let groups = query::bubble_group_view(&world);
    assert_eq!(groups.len(), 1);
    let group = groups.iter().next().expect("group");
    assert_eq!(group.bubbles.len(), 3);
    assert_eq!(group.created_at, Duration::ZERO);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::BubbleGroupsMerged { .. })));

    let events = run(&mut world, [tick(2800)]);
    let detonations = events
        .iter()
        .filter(|event| matches!(event, Event::BubbleGroupDetonated { .. }))
        .count();
    assert_eq!(detonations, 1);
    for player in [a, b, c] {
        assert_eq!(num_bubbles(&world, player), 1);
    }
}

#[test]
fn posts_occlude_the_blast() {
    let layout = LevelLayout::empty(15).with_tag(CellCoord::new(4, 6), LevelTag::Post);
    let mut world = world_with(layout);
    let player = PlayerId::new(1);
    let _ = run(
        &mut world,
        [spawn(player, 4, 4), Command::DropBubble { player }, tick(3000)],
    );

    let covered: Vec<CellCoord> = query::explosion_view(&world)
        .iter()
        .map(|snapshot| snapshot.cell)
        .filter(|cell| cell.row() == 4 && cell.column() >= 4)
        .collect();
    assert_eq!(covered, vec![CellCoord::new(4, 4), CellCoord::new(4, 5)]);
    assert_eq!(query::obstacles(&world).len(), 1);
}

#[test]
fn blasted_items_are_gone_before_anyone_collects_them() {
    let cell = CellCoord::new(4, 7);
    let layout = LevelLayout::empty(15).with_tag(cell, LevelTag::Item { kind: ItemKind::SpeedShoe });
    let mut world = world_with(layout);
    let owner = PlayerId::new(1);
    let collector = PlayerId::new(2);
    let _ = run(
        &mut world,
        [
            spawn(owner, 4, 4),
            spawn(collector, 10, 10),
            Command::DropBubble { player: owner },
        ],
    );

    let events = run(&mut world, [tick(3000)]);
    assert!(events.contains(&Event::ItemDestroyed {
        cell,
        kind: ItemKind::SpeedShoe,
    }));
    assert!(query::item_view(&world).at(cell).is_none());

    let events = run(
        &mut world,
        [Command::PickUpItem {
            player: collector,
            cell,
        }],
    );
    assert!(events.is_empty());
    let snapshot = query::player_view(&world);
    let collector = snapshot.get(collector).expect("collector");
    assert_eq!(collector.max_speed, 4.0);
}

#[test]
fn trapped_player_escapes_with_a_needle() {
    let spawn_cell = CellCoord::new(3, 3);
    let layout = LevelLayout::empty(15).with_tag(spawn_cell, LevelTag::Item { kind: ItemKind::Needle });
    let mut world = world_with(layout);
    let player = PlayerId::new(1);
    let _ = run(
        &mut world,
        [
            spawn(player, 3, 3),
            Command::PickUpItem {
                player,
                cell: spawn_cell,
            },
            Command::TrapPlayer { player },
        ],
    );

    let trapped = query::player_view(&world).get(player).cloned().expect("player");
    assert!(trapped.trapped);
    assert_eq!(trapped.inventory, vec![ItemKind::Needle]);

    let events = run(&mut world, [Command::UseItem { player, slot: 0 }]);
    assert_eq!(events, vec![Event::PlayerFreed { player }]);
    let freed = query::player_view(&world).get(player).cloned().expect("player");
    assert!(!freed.trapped);
    assert!(freed.inventory.is_empty());
    assert_eq!(freed.speed, freed.max_speed);
}
