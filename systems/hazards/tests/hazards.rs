use bubble_arena_core::{
    AnimationState, CellCoord, Command, ExplosionDirection, ExplosionGroupId, ExplosionSnapshot,
    ExplosionView, ItemKind, ItemSnapshot, ItemView, PlayerId, PlayerSnapshot, PlayerView, Rect,
};
use bubble_arena_system_hazards::Hazards;
use glam::Vec2;

fn player(id: u32, hitbox: Rect, trapped: bool) -> PlayerSnapshot {
    PlayerSnapshot {
        id: PlayerId::new(id),
        position: Vec2::new(hitbox.x, hitbox.y),
        hitbox,
        sprite: hitbox,
        cell: CellCoord::new(0, 0),
        num_bubbles: 1,
        explosion_range: 7,
        speed: 4.0,
        max_speed: 4.0,
        trapped,
        trapped_since: None,
        inventory: Vec::new(),
        animation: AnimationState::Idle,
        flip_x: false,
    }
}

fn explosion(group: u32, column: u32, rect: Rect) -> ExplosionSnapshot {
    ExplosionSnapshot {
        group: ExplosionGroupId::new(group),
        cell: CellCoord::new(0, column),
        direction: ExplosionDirection::Center,
        rect,
    }
}

#[test]
fn exactly_sixty_six_percent_does_not_trap() {
    let mut hazards = Hazards::new();
    let players = PlayerView::from_snapshots(vec![player(1, Rect::new(0.0, 0.0, 100.0, 1.0), false)]);
    let explosions = ExplosionView::from_snapshots(vec![explosion(
        0,
        0,
        Rect::new(34.0, 0.0, 80.0, 80.0),
    )]);
    let mut out = Vec::new();

    hazards.handle(&players, &explosions, &ItemView::default(), &mut out);

    assert!(out.is_empty(), "66% overlap must not trap the player");
}

#[test]
fn sixty_seven_percent_traps() {
    let mut hazards = Hazards::new();
    let players = PlayerView::from_snapshots(vec![player(1, Rect::new(0.0, 0.0, 100.0, 1.0), false)]);
    let explosions = ExplosionView::from_snapshots(vec![explosion(
        0,
        0,
        Rect::new(33.0, 0.0, 80.0, 80.0),
    )]);
    let mut out = Vec::new();

    hazards.handle(&players, &explosions, &ItemView::default(), &mut out);

    assert_eq!(
        out,
        vec![Command::TrapPlayer {
            player: PlayerId::new(1),
        }],
    );
}

#[test]
fn overlap_from_separate_groups_accumulates() {
    let mut hazards = Hazards::new();
    let players = PlayerView::from_snapshots(vec![player(3, Rect::new(0.0, 0.0, 100.0, 1.0), false)]);
    let explosions = ExplosionView::from_snapshots(vec![
        explosion(0, 0, Rect::new(-60.0, 0.0, 100.0, 1.0)),
        explosion(1, 1, Rect::new(40.0, 0.0, 80.0, 1.0)),
    ]);
    let mut out = Vec::new();

    hazards.handle(&players, &explosions, &ItemView::default(), &mut out);

    assert_eq!(
        out,
        vec![Command::TrapPlayer {
            player: PlayerId::new(3),
        }],
    );
}

#[test]
fn trapped_players_are_not_trapped_again_but_still_collect() {
    let mut hazards = Hazards::new();
    let hitbox = Rect::new(10.0, 60.0, 60.0, 20.0);
    let players = PlayerView::from_snapshots(vec![player(2, hitbox, true)]);
    let explosions =
        ExplosionView::from_snapshots(vec![explosion(0, 0, Rect::new(0.0, 0.0, 80.0, 80.0))]);
    let items = ItemView::from_snapshots(vec![ItemSnapshot {
        cell: CellCoord::new(0, 0),
        kind: ItemKind::Needle,
        rect: Rect::new(0.0, 0.0, 80.0, 80.0),
    }]);
    let mut out = Vec::new();

    hazards.handle(&players, &explosions, &items, &mut out);

    assert_eq!(
        out,
        vec![Command::PickUpItem {
            player: PlayerId::new(2),
            cell: CellCoord::new(0, 0),
        }],
    );
}

#[test]
fn emission_order_follows_player_identifiers() {
    let mut hazards = Hazards::new();
    let hitbox = Rect::new(10.0, 60.0, 60.0, 20.0);
    let players = PlayerView::from_snapshots(vec![player(5, hitbox, false), player(4, hitbox, false)]);
    let items = ItemView::from_snapshots(vec![ItemSnapshot {
        cell: CellCoord::new(0, 0),
        kind: ItemKind::Bubble,
        rect: Rect::new(0.0, 0.0, 80.0, 80.0),
    }]);
    let mut out = Vec::new();

    hazards.handle(&players, &ExplosionView::default(), &items, &mut out);

    assert_eq!(
        out,
        vec![
            Command::PickUpItem {
                player: PlayerId::new(4),
                cell: CellCoord::new(0, 0),
            },
            Command::PickUpItem {
                player: PlayerId::new(5),
                cell: CellCoord::new(0, 0),
            },
        ],
    );
}
