use tilebound_core::{
    DiagonalLedge, Direction, Hitbox, Ledges, MoveVerdict, MovementProperties, ObjectId,
    Point, SolidMask, TileBehaviors, TileCoord,
};
use tilebound_system_collision::{can_move, can_move_down, can_move_right, can_move_up};
use tilebound_world::{Area, AreaDefinition, Obstacle, PushableBlock};

const MOVER: ObjectId = ObjectId::new(1000);

fn open_area() -> Area {
    Area::new(8, 8, 16)
}

fn patch(area: &mut Area, x: i32, y: i32, behaviors: TileBehaviors) {
    area.patch_tile(0, TileCoord::new(x, y), Some(behaviors))
        .expect("tile inside the area");
}

fn ledge_scenario() -> Area {
    let definition: AreaDefinition = toml::from_str(
        r#"
        columns = 6
        rows = 8
        layers = [[
            "......",
            "......",
            "......",
            "..v...",
            "......",
            "......",
            "......",
            "......",
        ]]

        [palette]
        "v" = { ledges = { down = true } }
        "#,
    )
    .expect("scenario definition");
    Area::from_definition(&definition).expect("scenario area")
}

/// Steps the hitbox one pixel at a time until the resolver refuses, returning
/// the final hitbox and the refusing verdict.
fn walk(
    area: &Area,
    mut hitbox: Hitbox,
    direction: Direction,
    properties: &MovementProperties,
    max_steps: usize,
) -> (Hitbox, Option<MoveVerdict>) {
    for _ in 0..max_steps {
        let verdict = can_move(area, &hitbox, direction, properties);
        if !verdict.is_clear() {
            return (hitbox, Some(verdict));
        }
        hitbox = hitbox.moved(direction, 1.0);
    }
    (hitbox, None)
}

#[test]
fn descending_across_ledge_succeeds() {
    let area = ledge_scenario();
    let walker = MovementProperties::for_mover(MOVER);
    let (hitbox, verdict) = walk(
        &area,
        Hitbox::new(32.0, 40.0, 16.0, 16.0),
        Direction::Down,
        &walker,
        30,
    );
    assert!(verdict.is_none(), "descending was refused: {verdict:?}");
    assert_eq!(hitbox.y, 70.0);
}

#[test]
fn climbing_ledge_is_blocked_at_tile_edge_without_wiggle() {
    let area = ledge_scenario();
    let hero = MovementProperties::hero(MOVER);
    let (hitbox, verdict) = walk(
        &area,
        Hitbox::new(32.0, 70.0, 16.0, 16.0),
        Direction::Up,
        &hero,
        30,
    );
    assert_eq!(hitbox.y, 64.0);
    let verdict = verdict.expect("ledge blocks the climb");
    assert!(!verdict.is_clear());
    assert_eq!(verdict.wiggle(), None);
    assert!(verdict.pushed_objects().is_empty());
}

#[test]
fn ledge_crossers_climb_freely() {
    let area = ledge_scenario();
    let projectile = MovementProperties::projectile(MOVER);
    assert!(can_move_up(&area, &Hitbox::new(32.0, 64.0, 16.0, 16.0), &projectile).is_clear());
}

#[test]
fn partially_overlapping_ledge_still_blocks_climb() {
    let area = ledge_scenario();
    let walker = MovementProperties::for_mover(MOVER);
    let verdict = can_move_up(&area, &Hitbox::new(40.0, 64.0, 16.0, 16.0), &walker);
    assert_eq!(verdict.wiggle(), None);
    assert!(!verdict.is_clear());
}

#[test]
fn wiggle_points_toward_the_open_side() {
    let hero = MovementProperties::hero(MOVER);

    let mut lower_blocked = open_area();
    patch(&mut lower_blocked, 3, 1, TileBehaviors::solid_tile());
    let verdict = can_move_right(&lower_blocked, &Hitbox::new(32.0, 8.0, 16.0, 16.0), &hero);
    assert_eq!(verdict.wiggle(), Some(Direction::Up));

    let mut upper_blocked = open_area();
    patch(&mut upper_blocked, 3, 0, TileBehaviors::solid_tile());
    let verdict = can_move_right(&upper_blocked, &Hitbox::new(32.0, 8.0, 16.0, 16.0), &hero);
    assert_eq!(verdict.wiggle(), Some(Direction::Down));

    let mut left_blocked = open_area();
    patch(&mut left_blocked, 1, 3, TileBehaviors::solid_tile());
    let verdict = can_move_down(&left_blocked, &Hitbox::new(24.0, 32.0, 16.0, 16.0), &hero);
    assert_eq!(verdict.wiggle(), Some(Direction::Right));
}

#[test]
fn no_wiggle_without_capability_or_open_end() {
    let mut area = open_area();
    patch(&mut area, 3, 0, TileBehaviors::solid_tile());
    patch(&mut area, 3, 2, TileBehaviors::solid_tile());
    let hero = MovementProperties::hero(MOVER);

    let tall = Hitbox::new(32.0, 8.0, 16.0, 32.0);
    let verdict = can_move_right(&area, &tall, &hero);
    assert!(!verdict.is_clear());
    assert_eq!(verdict.wiggle(), None);

    let walker = MovementProperties::for_mover(MOVER);
    let verdict = can_move_right(&area, &Hitbox::new(32.0, 8.0, 16.0, 16.0), &walker);
    assert!(!verdict.is_clear());
    assert_eq!(verdict.wiggle(), None);
}

#[test]
fn full_width_wall_blocks_without_wiggle() {
    let mut area = open_area();
    patch(&mut area, 2, 1, TileBehaviors::solid_tile());
    let hero = MovementProperties::hero(MOVER);
    let verdict = can_move_up(&area, &Hitbox::new(32.0, 32.0, 16.0, 16.0), &hero);
    assert_eq!(
        verdict,
        MoveVerdict::Blocked(Default::default()),
        "a wall covering the whole edge offers nothing"
    );
}

#[test]
fn one_pixel_sliver_is_never_skipped() {
    let mut area = open_area();
    let sliver = ObjectId::new(7);
    let _ = area
        .add_object(Box::new(Obstacle::solid(
            sliver,
            Hitbox::new(40.0, 26.0, 1.0, 1.0),
        )))
        .expect("sliver registered");
    let hero = MovementProperties::hero(MOVER);

    let verdict = can_move_down(&area, &Hitbox::new(32.0, 10.0, 16.0, 16.0), &hero);
    assert_eq!(verdict.pushed_objects(), &[sliver]);
    assert_eq!(verdict.wiggle(), None);

    let beside = can_move_down(&area, &Hitbox::new(41.0, 10.0, 16.0, 16.0), &hero);
    assert!(beside.is_clear());
}

#[test]
fn blocking_objects_are_reported_once_and_exclusions_apply() {
    let mut area = open_area();
    let block = ObjectId::new(3);
    let _ = area
        .add_object(Box::new(PushableBlock::new(
            block,
            Point::new(48.0, 8.0),
            16.0,
        )))
        .expect("block registered");
    let hitbox = Hitbox::new(32.0, 8.0, 16.0, 16.0);

    let mut hero = MovementProperties::hero(MOVER);
    let verdict = can_move_right(&area, &hitbox, &hero);
    assert_eq!(verdict.pushed_objects(), &[block]);

    hero.exclude(block);
    assert!(can_move_right(&area, &hitbox, &hero).is_clear());
}

#[test]
fn pits_and_water_require_capabilities() {
    let mut area = open_area();
    patch(
        &mut area,
        3,
        0,
        TileBehaviors {
            pit: true,
            ..TileBehaviors::default()
        },
    );
    patch(
        &mut area,
        3,
        2,
        TileBehaviors {
            water: true,
            ..TileBehaviors::default()
        },
    );
    let walker = MovementProperties::for_mover(MOVER);
    let hero = MovementProperties::hero(MOVER);

    let beside_pit = Hitbox::new(32.0, 0.0, 16.0, 16.0);
    let verdict = can_move_right(&area, &beside_pit, &walker);
    assert!(!verdict.is_clear());
    assert_eq!(verdict.wiggle(), None);
    assert!(can_move_right(&area, &beside_pit, &hero).is_clear());

    let beside_water = Hitbox::new(32.0, 32.0, 16.0, 16.0);
    assert!(!can_move_right(&area, &beside_water, &walker).is_clear());
    assert!(can_move_right(&area, &beside_water, &hero).is_clear());

    let inside_pit = Hitbox::new(50.0, 2.0, 8.0, 8.0);
    assert!(can_move_right(&area, &inside_pit, &walker).is_clear());
}

#[test]
fn full_tile_movers_treat_partial_tiles_as_solid() {
    let mut area = open_area();
    patch(
        &mut area,
        3,
        0,
        TileBehaviors {
            solid_mask: SolidMask::TOP_LEFT,
            ..TileBehaviors::default()
        },
    );
    let hitbox = Hitbox::new(32.0, 8.0, 16.0, 8.0);
    let mut properties = MovementProperties::for_mover(MOVER);
    assert!(can_move_right(&area, &hitbox, &properties).is_clear());

    properties.needs_full_tile = true;
    assert!(!can_move_right(&area, &hitbox, &properties).is_clear());
}

#[test]
fn off_map_steps_are_permitted() {
    let area = Area::new(4, 4, 16);
    let walker = MovementProperties::for_mover(MOVER);
    assert!(can_move_right(&area, &Hitbox::new(48.0, 0.0, 16.0, 16.0), &walker).is_clear());
    assert!(can_move_up(&area, &Hitbox::new(0.0, 0.0, 16.0, 16.0), &walker).is_clear());
}

#[test]
fn diagonal_ledge_is_one_way() {
    let mut area = open_area();
    patch(
        &mut area,
        2,
        2,
        TileBehaviors {
            diagonal_ledge: Some(DiagonalLedge::DownRight),
            ..TileBehaviors::default()
        },
    );
    let walker = MovementProperties::for_mover(MOVER);

    let on_low_side = Hitbox::new(40.0, 39.0, 1.0, 1.0);
    assert!(!can_move_up(&area, &on_low_side, &walker).is_clear());

    let on_high_side = Hitbox::new(40.0, 38.0, 1.0, 1.0);
    assert!(can_move_down(&area, &on_high_side, &walker).is_clear());

    let projectile = MovementProperties::projectile(MOVER);
    assert!(can_move_up(&area, &on_low_side, &projectile).is_clear());
}

#[test]
fn diagonal_ledge_from_an_object_is_one_way() {
    let mut area = open_area();
    let slope = ObjectId::new(9);
    let _ = area
        .add_object(Box::new(Obstacle::new(
            slope,
            Hitbox::new(32.0, 32.0, 16.0, 16.0),
            TileBehaviors {
                diagonal_ledge: Some(DiagonalLedge::DownRight),
                ..TileBehaviors::default()
            },
        )))
        .expect("slope registered");
    let walker = MovementProperties::for_mover(MOVER);

    let on_low_side = Hitbox::new(40.0, 39.0, 1.0, 1.0);
    assert_eq!(
        can_move_up(&area, &on_low_side, &walker),
        MoveVerdict::Blocked(Default::default())
    );
    assert!(can_move_down(&area, &Hitbox::new(40.0, 38.0, 1.0, 1.0), &walker).is_clear());

    let mut ignoring = MovementProperties::for_mover(MOVER);
    ignoring.exclude(slope);
    assert!(can_move_up(&area, &on_low_side, &ignoring).is_clear());
}

#[test]
fn movers_escape_solids_they_already_overlap() {
    let mut area = open_area();
    patch(&mut area, 1, 1, TileBehaviors::solid_tile());
    let walker = MovementProperties::for_mover(MOVER);
    let stuck = Hitbox::new(20.0, 20.0, 8.0, 8.0);
    assert!(can_move(&area, &stuck, Direction::Left, &walker).is_clear());
}

#[test]
fn explicit_false_cancels_layered_ledge() {
    let mut area = ledge_scenario();
    let overlay = area.push_layer();
    area.patch_tile(
        overlay,
        TileCoord::new(2, 3),
        Some(TileBehaviors {
            ledges: Ledges {
                down: Some(false),
                ..Ledges::default()
            },
            ..TileBehaviors::default()
        }),
    )
    .expect("overlay patch");
    let walker = MovementProperties::for_mover(MOVER);
    assert!(can_move_up(&area, &Hitbox::new(32.0, 64.0, 16.0, 16.0), &walker).is_clear());
}
