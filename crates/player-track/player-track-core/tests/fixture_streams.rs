use player_track_core::{
    Collaborators, Config, CustomEventData, Dispatcher, ObjectFactory, PlayerObject, Pose,
    PoseCompositor, Quat, Track, TrackStore, Vec3,
};
use player_track_test_fixtures as fixtures;

struct Scene {
    config: Config,
}

impl ObjectFactory for Scene {
    fn instantiate(&mut self, target: PlayerObject) -> Option<PoseCompositor> {
        let local = match target {
            PlayerObject::Root => Pose::IDENTITY,
            PlayerObject::Head => Pose::from_position(Vec3::new(0.0, 1.7, 0.0)),
            _ => return None,
        };
        Some(PoseCompositor::new(
            target,
            local,
            &self.config,
            Collaborators::default(),
        ))
    }
}

fn load_tracks() -> TrackStore {
    let mut tracks = TrackStore::new();
    for name in ["offset-x", "local-rotation-y90", "empty", "full"] {
        let json = fixtures::tracks::json(name).expect("track fixture");
        tracks.insert_json(&json).expect("parse track fixture");
    }
    tracks
}

fn load_events(name: &str) -> Vec<CustomEventData> {
    fixtures::events::load(name).expect("event fixture")
}

/// it should replay an assignment stream and end on the last track per object
#[test]
fn replays_assignment_stream() {
    let mut tracks = load_tracks();
    let mut scene = Scene {
        config: Config::default(),
    };
    let mut dispatcher = Dispatcher::new();

    let applied = load_events("assign-head-then-root")
        .iter()
        .filter(|e| dispatcher.handle_event(e, &mut tracks, &mut scene))
        .count();
    assert_eq!(applied, 3);
    assert_eq!(dispatcher.len(), 2);

    let idle = tracks.resolve("idle").unwrap();
    let head_turn = tracks.resolve("headTurn").unwrap();
    assert_eq!(dispatcher.compositor(PlayerObject::Head).unwrap().track(), Some(idle));
    assert!(tracks.get(head_turn).unwrap().attached().is_empty());

    let out = dispatcher.update(&tracks);
    assert_eq!(out.get(PlayerObject::Head), Some(Pose::from_position(Vec3::new(0.0, 1.7, 0.0))));
    let root = out.root().unwrap();
    assert!(root.position.abs_diff_eq(Vec3::new(0.6, 0.0, 0.0), 1e-6));
}

/// it should ignore foreign and broken events on a shared channel
#[test]
fn mixed_channel_only_applies_valid_assignment() {
    let mut tracks = load_tracks();
    let mut scene = Scene {
        config: Config::default(),
    };
    let mut dispatcher = Dispatcher::new();

    let results: Vec<bool> = load_events("mixed-channel")
        .iter()
        .map(|e| dispatcher.handle_event(e, &mut tracks, &mut scene))
        .collect();
    assert_eq!(results, vec![false, false, false, true]);
    assert_eq!(dispatcher.len(), 1);
    assert!(dispatcher.compositor(PlayerObject::Root).is_some());
}

/// it should honour a left-handed config loaded from disk
#[test]
fn left_handed_config_mirrors_fixture() {
    let json = fixtures::configs::json("left-handed").unwrap();
    let config = Config::from_json(&json).unwrap();
    let mut tracks = load_tracks();
    let mut scene = Scene { config };
    let mut dispatcher = Dispatcher::new();

    let id = tracks.resolve("playerOffset").unwrap();
    dispatcher.assign(PlayerObject::Root, id, &mut tracks, &mut scene);
    let root = dispatcher.update(&tracks).root().unwrap();
    assert!(root.position.abs_diff_eq(Vec3::new(-0.6, 0.0, 0.0), 1e-6));
}

/// it should compose every property of the full fixture in order
#[test]
fn full_fixture_composes_all_properties() {
    let mut tracks = load_tracks();
    let id = tracks.resolve("playerFull").unwrap();
    let mut scene = Scene {
        config: Config::default(),
    };
    let mut dispatcher = Dispatcher::new();
    dispatcher.assign(PlayerObject::Head, id, &mut tracks, &mut scene);

    let head = dispatcher.update(&tracks).get(PlayerObject::Head).unwrap();
    let track: &Track = tracks.get(id).unwrap();
    let offset = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    let local = Quat::from_rotation_x(std::f32::consts::FRAC_PI_4);
    let expected_pos = offset * (Vec3::new(0.0, 1.0, 2.0) * 0.6 + Vec3::new(0.0, 1.7, 0.0));
    assert!(head.position.abs_diff_eq(expected_pos, 1e-5), "{:?}", head.position);
    assert!(head.rotation.abs_diff_eq(offset * local, 1e-5));
    assert_eq!(track.attached(), &[PlayerObject::Head]);
}

/// it should keep the legacy config off the per-frame path
#[test]
fn legacy_config_fixture_disables_composition() {
    let config = Config::from_json(&fixtures::configs::json("legacy").unwrap()).unwrap();
    let mut tracks = load_tracks();
    let id = tracks.resolve("playerOffset").unwrap();
    let mut scene = Scene { config };
    let mut dispatcher = Dispatcher::new();
    dispatcher.assign(PlayerObject::Root, id, &mut tracks, &mut scene);
    assert!(dispatcher.update(&tracks).is_empty());
}
