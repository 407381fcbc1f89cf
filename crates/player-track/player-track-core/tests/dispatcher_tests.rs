use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use player_track_core::{
    properties::{LOCAL_ROTATION, OFFSET_POSITION},
    Collaborators, Config, CustomEventData, DataVersion, Dispatcher, LegacyTransformController,
    ObjectFactory, PlayerObject, Pose, PoseCompositor, Quat, Track, TrackId, TrackStore, Vec3,
    ASSIGN_PLAYER_TO_TRACK,
};
use serde_json::json;

#[derive(Debug, Default)]
struct ControllerLog {
    created: Vec<(PlayerObject, TrackId)>,
    enabled: Vec<bool>,
    released: usize,
}

#[derive(Debug)]
struct FakeController {
    log: Arc<Mutex<ControllerLog>>,
}

impl LegacyTransformController for FakeController {
    fn set_enabled(&mut self, enabled: bool) {
        self.log.lock().unwrap().enabled.push(enabled);
    }

    fn release(&mut self) {
        self.log.lock().unwrap().released += 1;
    }
}

/// Scene stand-in: knows the local pose of each object that exists.
struct SceneFactory {
    locals: HashMap<PlayerObject, Pose>,
    config: Config,
    collaborators: Collaborators,
    instantiated: Vec<PlayerObject>,
    controllers: Arc<Mutex<ControllerLog>>,
}

impl SceneFactory {
    fn new(config: Config) -> Self {
        let mut locals = HashMap::new();
        locals.insert(PlayerObject::Root, Pose::IDENTITY);
        locals.insert(
            PlayerObject::Head,
            Pose::new(Vec3::new(0.0, 1.7, 0.0), Quat::from_rotation_x(0.1)),
        );
        Self {
            locals,
            config,
            collaborators: Collaborators {
                pause_controller: true,
                ..Collaborators::default()
            },
            instantiated: Vec::new(),
            controllers: Arc::new(Mutex::new(ControllerLog::default())),
        }
    }
}

impl ObjectFactory for SceneFactory {
    fn instantiate(&mut self, target: PlayerObject) -> Option<PoseCompositor> {
        let local = *self.locals.get(&target)?;
        self.instantiated.push(target);
        Some(PoseCompositor::new(
            target,
            local,
            &self.config,
            self.collaborators,
        ))
    }

    fn legacy_controller(
        &mut self,
        target: PlayerObject,
        track: TrackId,
    ) -> Option<Box<dyn LegacyTransformController>> {
        self.controllers.lock().unwrap().created.push((target, track));
        Some(Box::new(FakeController {
            log: Arc::clone(&self.controllers),
        }))
    }
}

fn assign_event(track: &str, object: &str) -> CustomEventData {
    CustomEventData::new(
        ASSIGN_PLAYER_TO_TRACK,
        json!({ "track": track, "playerTrackObject": object }),
    )
}

/// it should create a compositor exactly once per player object and reuse it
#[test]
fn lazily_creates_then_reuses_compositor() {
    let mut tracks = TrackStore::new();
    let a = tracks.insert(Track::new("a"));
    let b = tracks.insert(Track::new("b"));
    let mut factory = SceneFactory::new(Config::default());
    let mut dispatcher = Dispatcher::new();

    assert!(dispatcher.is_empty());
    assert!(dispatcher.handle_event(&assign_event("a", "head"), &mut tracks, &mut factory));
    assert_eq!(factory.instantiated, vec![PlayerObject::Head]);
    assert_eq!(dispatcher.compositor(PlayerObject::Head).unwrap().track(), Some(a));

    assert!(dispatcher.handle_event(&assign_event("b", "head"), &mut tracks, &mut factory));
    assert_eq!(factory.instantiated, vec![PlayerObject::Head]);
    assert_eq!(dispatcher.len(), 1);
    assert_eq!(dispatcher.compositor(PlayerObject::Head).unwrap().track(), Some(b));
}

/// it should detach from the previous track so its values no longer matter
#[test]
fn reassignment_detaches_previous_track() {
    let mut tracks = TrackStore::new();
    let a = tracks.insert(Track::new("a").with_property(OFFSET_POSITION, Vec3::X));
    let b = tracks.insert(Track::new("b"));
    let mut factory = SceneFactory::new(Config::default());
    let mut dispatcher = Dispatcher::new();

    dispatcher.assign(PlayerObject::Root, a, &mut tracks, &mut factory);
    assert!(tracks.get(a).unwrap().is_attached(PlayerObject::Root));

    dispatcher.assign(PlayerObject::Root, b, &mut tracks, &mut factory);
    assert!(!tracks.get(a).unwrap().is_attached(PlayerObject::Root));
    assert_eq!(tracks.get(b).unwrap().attached(), &[PlayerObject::Root]);

    let before = dispatcher.update(&tracks);
    tracks
        .get_mut(a)
        .unwrap()
        .set_property(OFFSET_POSITION, Vec3::new(9.0, 9.0, 9.0));
    let after = dispatcher.update(&tracks);
    assert_eq!(before, after);
    assert_eq!(after.root(), Some(Pose::IDENTITY));
}

/// it should tolerate assigning the same track twice
#[test]
fn same_track_assignment_is_harmless() {
    let mut tracks = TrackStore::new();
    let a = tracks.insert(Track::new("a"));
    let mut factory = SceneFactory::new(Config::default());
    let mut dispatcher = Dispatcher::new();

    dispatcher.assign(PlayerObject::Head, a, &mut tracks, &mut factory);
    dispatcher.assign(PlayerObject::Head, a, &mut tracks, &mut factory);
    assert_eq!(tracks.get(a).unwrap().attached(), &[PlayerObject::Head]);
    assert_eq!(dispatcher.compositor(PlayerObject::Head).unwrap().track(), Some(a));
}

/// it should drop events that do not resolve, without creating anything
#[test]
fn unresolvable_events_are_ignored() {
    let mut tracks = TrackStore::new();
    tracks.insert(Track::new("a"));
    let mut factory = SceneFactory::new(Config::default());
    let mut dispatcher = Dispatcher::new();

    let events = [
        CustomEventData::new("AnimateTrack", json!({ "track": "a" })),
        assign_event("missing", "head"),
        assign_event("a", "tail"),
        CustomEventData::new(ASSIGN_PLAYER_TO_TRACK, json!(null)),
        // Right hand does not exist in this scene.
        assign_event("a", "rightHand"),
    ];
    for event in &events {
        assert!(!dispatcher.handle_event(event, &mut tracks, &mut factory));
    }
    assert!(dispatcher.is_empty());
    assert!(factory.instantiated.is_empty());
    assert!(tracks.get(tracks.resolve("a").unwrap()).unwrap().attached().is_empty());
}

/// it should compose root first and only objects that have a track
#[test]
fn update_writes_every_enabled_compositor() {
    let mut tracks = TrackStore::new();
    let head_turn = tracks.insert(
        Track::new("turn").with_property(LOCAL_ROTATION, Quat::from_rotation_y(0.5)),
    );
    let offset = tracks.insert(Track::new("offset").with_property(OFFSET_POSITION, Vec3::Z));
    let mut factory = SceneFactory::new(Config::default());
    let mut dispatcher = Dispatcher::new();

    dispatcher.assign(PlayerObject::Head, head_turn, &mut tracks, &mut factory);
    dispatcher.assign(PlayerObject::Root, offset, &mut tracks, &mut factory);

    let out = dispatcher.update(&tracks);
    assert_eq!(out.writes.len(), 2);
    assert_eq!(out.writes[0].target, PlayerObject::Root);
    assert!(out
        .root()
        .unwrap()
        .position
        .abs_diff_eq(Vec3::new(0.0, 0.0, 0.6), 1e-6));
    let head = out.get(PlayerObject::Head).unwrap();
    assert_eq!(head.position, Vec3::new(0.0, 1.7, 0.0));
}

/// it should prefer the head as camera anchor and fall back to the root
#[test]
fn camera_anchor_prefers_head() {
    let mut tracks = TrackStore::new();
    let a = tracks.insert(Track::new("a"));
    let mut factory = SceneFactory::new(Config::default());
    let mut dispatcher = Dispatcher::new();

    assert!(dispatcher.camera_anchor().is_none());
    dispatcher.assign(PlayerObject::Root, a, &mut tracks, &mut factory);
    assert_eq!(dispatcher.camera_anchor().unwrap().target(), PlayerObject::Root);
    dispatcher.assign(PlayerObject::Head, a, &mut tracks, &mut factory);
    assert_eq!(dispatcher.camera_anchor().unwrap().target(), PlayerObject::Head);
}

/// it should never compose on the legacy path and rebuild the controller per assignment
#[test]
fn legacy_path_uses_controller() {
    let config = Config {
        data_version: DataVersion::Legacy,
        ..Config::default()
    };
    let mut tracks = TrackStore::new();
    let a = tracks.insert(Track::new("a").with_property(OFFSET_POSITION, Vec3::X));
    let b = tracks.insert(Track::new("b"));
    let mut factory = SceneFactory::new(config);
    let log = Arc::clone(&factory.controllers);
    let mut dispatcher = Dispatcher::new();

    dispatcher.assign(PlayerObject::Root, a, &mut tracks, &mut factory);
    let root = dispatcher.compositor(PlayerObject::Root).unwrap();
    assert!(root.is_legacy());
    assert!(!root.is_enabled());
    assert!(root.has_legacy_controller());
    assert!(dispatcher.update(&tracks).is_empty());

    dispatcher.assign(PlayerObject::Root, b, &mut tracks, &mut factory);
    {
        let log = log.lock().unwrap();
        assert_eq!(log.created, vec![(PlayerObject::Root, a), (PlayerObject::Root, b)]);
        assert_eq!(log.released, 1);
    }

    dispatcher.teardown(&mut tracks);
    assert_eq!(log.lock().unwrap().released, 2);
    assert!(dispatcher.is_empty());
    assert!(tracks.get(b).unwrap().attached().is_empty());
}

/// it should never ask for a legacy controller on the current path
#[test]
fn current_path_never_builds_controller() {
    let mut tracks = TrackStore::new();
    let a = tracks.insert(Track::new("a"));
    let mut factory = SceneFactory::new(Config::default());
    let mut dispatcher = Dispatcher::new();

    dispatcher.assign(PlayerObject::Root, a, &mut tracks, &mut factory);
    assert!(factory.controllers.lock().unwrap().created.is_empty());
    assert!(!dispatcher.compositor(PlayerObject::Root).unwrap().has_legacy_controller());
}
