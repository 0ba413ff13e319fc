use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use dungeon_caster::config::{EngineConfig, OverlayConfig};
use dungeon_caster::engine::{Engine, FrameInput, MAX_DISTANCE, Outcome, Side, cast_ray};
use dungeon_caster::renderer::{Rgba, Software};
use dungeon_caster::world::{
    GridMap, ObjectKind, ObjectState, Pose, SpriteRecord, Texture, TextureKind, TextureStore,
    names, overlay,
};
use glam::vec2;

/// Solid 10×10 block with a single open cell at (5, 5).
fn pocket() -> GridMap {
    let rows: Vec<String> = (0..10)
        .map(|y| {
            (0..10)
                .map(|x| if (x, y) == (5, 5) { '.' } else { 'W' })
                .collect()
        })
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    GridMap::from_rows(&rows, HashMap::new()).unwrap()
}

fn dressed_store() -> TextureStore {
    let mut store = TextureStore::new();
    store.insert(
        names::STONE_WALL,
        TextureKind::Wall,
        Texture::solid(names::STONE_WALL, 64, 64, [120, 120, 120, 255]),
    );
    store.insert(
        "torch",
        TextureKind::Overlay,
        Texture::solid("torch", 64, 64, [255, 160, 0, 255]),
    );
    store
}

fn frame(engine: &mut Engine<Software>, input: FrameInput<'_>) -> Vec<Rgba> {
    let mut out = Vec::new();
    engine.render(input, |fb, _, _| out = fb.to_vec());
    out
}

#[test]
fn pocket_ray_hits_east_wall() {
    let hit = cast_ray(vec2(5.5, 5.5), 0.0, &pocket(), false);
    assert_eq!(hit.side, Side::X);
    assert_eq!(hit.map_x, 6);
    assert!((hit.distance - 0.5).abs() < 1e-4);
}

#[test]
fn grid_parallel_rays_are_finite() {
    let map = GridMap::fallback();
    for angle in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
        let hit = cast_ray(vec2(1.5, 1.5), angle, &map, false);
        assert!(hit.distance.is_finite(), "angle {angle}");
        assert!(hit.distance > 0.0);
    }
}

#[test]
fn every_direction_terminates_within_range() {
    let map = GridMap::fallback();
    for start in [vec2(1.5, 1.5), vec2(4.2, 8.7), vec2(8.9, 1.1)] {
        for i in 0..360 {
            let angle = TAU * i as f32 / 360.0;
            let hit = cast_ray(start, angle, &map, false);
            assert!(hit.distance <= MAX_DISTANCE);
        }
    }
}

#[test]
fn walking_never_enters_a_wall() {
    let map = GridMap::fallback();
    for i in 0..24 {
        let mut pose = Pose::at_cell(1, 1, TAU * i as f32 / 24.0);
        for step in 0..200 {
            if step % 3 == 0 {
                pose.strafe(&map, 0.15);
            } else {
                pose.advance(&map, 0.15);
            }
            assert!(!map.is_wall(pose.pos.x, pose.pos.y), "{:?}", pose.pos);
        }
    }
}

#[test]
fn secret_walls_only_show_in_debug() {
    let map = pocket().with_secrets([(6, 5)]);
    assert_eq!(map.wall_texture_name_at(6, 5, false), names::STONE_WALL);
    assert_ne!(map.wall_texture_name_at(6, 5, true), names::STONE_WALL);
    assert_eq!(cast_ray(vec2(5.5, 5.5), 0.0, &map, false).texture, names::STONE_WALL);
    assert_eq!(cast_ray(vec2(5.5, 5.5), 0.0, &map, true).texture, names::SECRET_WALL_DEBUG);
}

#[test]
fn overlay_placement_is_seeded() {
    let map = GridMap::fallback();
    let config = OverlayConfig::default();
    let a = overlay::generate(&map, &config, &["moss", "torch"]);
    let b = overlay::generate(&map, &config, &["moss", "torch"]);
    assert!(!a.is_empty());
    assert_eq!(a, b);

    let other = OverlayConfig {
        random_seed: config.random_seed + 1,
        ..config
    };
    assert_ne!(a, overlay::generate(&map, &other, &["moss", "torch"]));
}

#[test]
fn open_room_has_no_overlays() {
    let map = GridMap::from_rows(&["...", "..."], HashMap::new()).unwrap();
    assert!(overlay::generate(&map, &OverlayConfig::default(), &["torch"]).is_empty());
}

#[test]
fn unreadable_texture_gets_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = TextureStore::new();
    let missing = dir.path().join("missing.png");
    let tex = store.load_texture("brick_wall", missing, TextureKind::Wall);
    assert_eq!((tex.w, tex.h), (64, 64));
    assert_eq!(tex.pixels.len(), 64 * 64 * 4);
    assert!(store.contains("brick_wall"));
}

#[test]
fn same_inputs_same_frame() {
    let mut engine = Engine::new(
        Software::new(),
        dressed_store(),
        EngineConfig::default(),
        80,
        60,
    );
    assert!(!engine.overlays().is_empty());
    engine.set_pose(Pose::new(vec2(3.3, 1.6), 0.4));

    let sprites = [SpriteRecord::enemy("skeleton", vec2(6.5, 1.5))];
    let input = FrameInput {
        sprites: &sprites,
        attacking: false,
        time_ms: 0,
    };
    let a = frame(&mut engine, input);
    let b = frame(&mut engine, input);
    assert_eq!(a.len(), 80 * 60);
    assert_eq!(a, b);
}

#[test]
fn chest_opens_once() {
    let objects = HashMap::from([(
        'C',
        ObjectState {
            contains: Some(serde_json::json!({ "type": "key", "keyType": "gold" })),
            ..ObjectState::new(ObjectKind::Chest)
        },
    )]);
    let map = GridMap::from_rows(&["WWWWW", "W..CW", "WWWWW"], objects).unwrap();

    let mut engine = Engine::new(
        Software::new(),
        TextureStore::new(),
        EngineConfig::default(),
        32,
        24,
    );
    engine.set_map(map);
    engine.set_pose(Pose::new(vec2(1.5, 1.5), 0.0));

    let first = engine.interact().unwrap();
    assert_eq!(first.outcome, Outcome::ChestOpened);
    assert!(engine.map().object('C').unwrap().opened);
    assert_eq!(engine.interact().unwrap().outcome, Outcome::ChestEmpty);

    let items = SpriteRecord::scan_items(engine.map());
    assert!(items[0].opened);
}
