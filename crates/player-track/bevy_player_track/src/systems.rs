use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::{
    CameraTrackingProxy, ConnectedPlayer, MultiplayerAvatar, OutroSequenceAnchor,
    PauseMenuAnchor, PlayerTrackTarget,
};
use crate::events::{CustomEvent, PauseSignal, SessionTeardown};
use crate::resources::{
    ActivePlayers, LegacyControllerFactory, PauseController, PendingPoses, PlayerTargets,
    PlayerTrackDispatcher, PlayerTrackSettings, StagedEvents, Tracks,
};
use player_track_core::{
    Collaborators, LegacyTransformController, MultiplayerSession, ObjectFactory, OutroAnchor,
    Outputs, PlayerObject, Pose, PoseCompositor, TrackId, UserId,
};

pub const ROOT_PROXY_NAME: &str = "NoodlePlayerTrackRoot";
pub const HEAD_PROXY_NAME: &str = "NoodlePlayerTrackHead";

fn local_pose(tf: &Transform) -> Pose {
    Pose::new(tf.translation, tf.rotation)
}

/// World pose of `entity` folded from the `Transform` chain up to its
/// topmost ancestor. Reads this frame's writes before propagation runs.
/// Scale is ignored.
fn hierarchy_world(world: &World, entity: Entity) -> Pose {
    let mut pose = Pose::IDENTITY;
    let mut current = Some(entity);
    while let Some(e) = current {
        if let Some(tf) = world.get::<Transform>(e) {
            pose = local_pose(tf).mul_pose(&pose);
        }
        current = world.get::<Parent>(e).map(Parent::get);
    }
    pose
}

/// World pose of an entity's parent, identity when it has none.
fn parent_world(world: &World, entity: Entity) -> Pose {
    world
        .get::<Parent>(entity)
        .map(|parent| hierarchy_world(world, parent.get()))
        .unwrap_or(Pose::IDENTITY)
}

fn write_local(world: &mut World, entity: Entity, local: Pose) {
    if let Some(mut tf) = world.get_mut::<Transform>(entity) {
        tf.translation = local.position;
        tf.rotation = local.rotation;
    }
}

/// Copies this frame's player-track events into [`StagedEvents`]. Events are
/// read, not consumed, so other readers on the shared channels still see them.
pub fn collect_player_track_events_system(
    mut custom: EventReader<CustomEvent>,
    mut pause: EventReader<PauseSignal>,
    mut teardown: EventReader<SessionTeardown>,
    mut staged: ResMut<StagedEvents>,
) {
    staged
        .assignments
        .extend(custom.read().map(|CustomEvent(event)| event.clone()));
    staged
        .signals
        .extend(pause.read().map(|PauseSignal(signal)| *signal));
    if teardown.read().count() > 0 {
        staged.teardown = true;
    }
}

/// Rebuilds the PlayerObject -> Entity index from [`PlayerTrackTarget`] markers.
pub fn index_player_targets_system(
    targets: Query<(Entity, &PlayerTrackTarget)>,
    mut index: ResMut<PlayerTargets>,
) {
    let mut map = HashMap::new();
    for (entity, target) in targets.iter() {
        map.insert(target.0, entity);
    }
    index.map = map;
}

/// Builds compositors on demand from the scene. Captures the target's local
/// pose as its reference and wires scene-side helpers for root and head.
struct WorldFactory<'w> {
    world: &'w mut World,
}

impl WorldFactory<'_> {
    fn has_outro_anchor(&mut self) -> bool {
        let mut q = self
            .world
            .query_filtered::<Entity, With<OutroSequenceAnchor>>();
        let found = q.iter(self.world).next().is_some();
        found
    }

    fn reparent_pause_menus(&mut self, root: Entity) {
        let mut q = self.world.query_filtered::<Entity, With<PauseMenuAnchor>>();
        let menus: Vec<Entity> = q.iter(self.world).collect();
        for menu in menus {
            self.world.entity_mut(menu).set_parent(root);
        }
    }

    fn spawn_camera_proxy(&mut self, parent: Entity, name: &'static str) {
        let proxy = self
            .world
            .spawn((
                Name::new(name),
                CameraTrackingProxy,
                Transform::default(),
                GlobalTransform::default(),
            ))
            .id();
        self.world.entity_mut(parent).add_child(proxy);
    }
}

impl ObjectFactory for WorldFactory<'_> {
    fn instantiate(&mut self, target: PlayerObject) -> Option<PoseCompositor> {
        let entity = self
            .world
            .get_resource::<PlayerTargets>()?
            .map
            .get(&target)
            .copied()?;
        let local = local_pose(self.world.get::<Transform>(entity)?);
        let config = self
            .world
            .get_resource::<PlayerTrackSettings>()
            .map(|s| s.0.clone())
            .unwrap_or_default();

        let collaborators = Collaborators {
            pause_controller: self.world.contains_resource::<PauseController>(),
            multiplayer_session: target.is_root()
                && self.world.contains_resource::<ActivePlayers>(),
            outro_anchor: target.is_root() && self.has_outro_anchor(),
        };
        let compositor = PoseCompositor::new(target, local, &config, collaborators);

        match target {
            PlayerObject::Root => {
                self.reparent_pause_menus(entity);
                self.spawn_camera_proxy(entity, ROOT_PROXY_NAME);
            }
            PlayerObject::Head => self.spawn_camera_proxy(entity, HEAD_PROXY_NAME),
            _ => {}
        }
        info!("player track: compositor created for {target}");
        Some(compositor)
    }

    fn legacy_controller(
        &mut self,
        target: PlayerObject,
        track: TrackId,
    ) -> Option<Box<dyn LegacyTransformController>> {
        self.world
            .get_resource::<LegacyControllerFactory>()
            .map(|factory| (factory.0)(target, track))
    }
}

/// Routes staged [`CustomEvent`]s through the dispatcher.
pub fn dispatch_track_assignments_system(world: &mut World) {
    let events = match world.get_resource_mut::<StagedEvents>() {
        Some(mut staged) => std::mem::take(&mut staged.assignments),
        None => return,
    };
    if events.is_empty() {
        return;
    }
    if !world.contains_resource::<PlayerTrackDispatcher>() || !world.contains_resource::<Tracks>()
    {
        return;
    }
    world.resource_scope(|world, mut dispatcher: Mut<PlayerTrackDispatcher>| {
        world.resource_scope(|world, mut tracks: Mut<Tracks>| {
            let mut factory = WorldFactory { world };
            for event in &events {
                dispatcher.0.handle_event(event, &mut tracks.0, &mut factory);
            }
        });
    });
}

/// Forwards pause/resume to every compositor and snaps paused targets back
/// to their reference pose.
pub fn pause_signals_system(world: &mut World) {
    let signals = match world.get_resource_mut::<StagedEvents>() {
        Some(mut staged) => std::mem::take(&mut staged.signals),
        None => return,
    };
    for signal in signals {
        let snaps = match world.get_resource_mut::<PlayerTrackDispatcher>() {
            Some(mut dispatcher) => dispatcher.0.signal(signal),
            None => return,
        };
        apply_outputs(world, &snaps);
    }
}

fn apply_outputs(world: &mut World, outputs: &Outputs) {
    let targets = match world.get_resource::<PlayerTargets>() {
        Some(index) => index.map.clone(),
        None => return,
    };
    for write in &outputs.writes {
        if let Some(&entity) = targets.get(&write.target) {
            write_local(world, entity, write.local);
        }
    }
}

/// Composes this frame's poses and stashes them into [`PendingPoses`].
pub fn compose_poses_system(
    dispatcher: Res<PlayerTrackDispatcher>,
    tracks: Res<Tracks>,
    mut pending: ResMut<PendingPoses>,
) {
    pending.outputs = dispatcher.0.update(&tracks.0);
}

/// Writes staged poses into target Transforms.
pub fn apply_poses_system(
    pending: Res<PendingPoses>,
    index: Res<PlayerTargets>,
    mut transforms: Query<&mut Transform>,
) {
    for write in &pending.outputs.writes {
        let Some(&entity) = index.map.get(&write.target) else {
            continue;
        };
        if let Ok(mut tf) = transforms.get_mut(entity) {
            tf.translation = write.local.position;
            tf.rotation = write.local.rotation;
        }
    }
}

/// Connected players captured from the world for one mirror pass. Avatar
/// writes are converted to facade-local poses and applied afterwards.
struct EcsSession {
    players: Vec<UserId>,
    facades: HashMap<UserId, (Pose, Option<Entity>)>,
    writes: Vec<(Entity, Pose)>,
}

impl EcsSession {
    fn capture(world: &mut World, players: Vec<UserId>) -> Self {
        let mut q = world.query::<(Entity, &ConnectedPlayer, Option<&Children>)>();
        let connected: Vec<(Entity, UserId, Vec<Entity>)> = q
            .iter(world)
            .map(|(entity, player, children)| {
                let children = children.map(|c| c.to_vec()).unwrap_or_default();
                (entity, player.user_id.clone(), children)
            })
            .collect();

        let mut facades = HashMap::new();
        for (entity, user, children) in connected {
            let facade = hierarchy_world(world, entity);
            let avatar = children
                .into_iter()
                .find(|&child| world.get::<MultiplayerAvatar>(child).is_some());
            facades.insert(user, (facade, avatar));
        }
        Self {
            players,
            facades,
            writes: Vec::new(),
        }
    }
}

impl MultiplayerSession for EcsSession {
    fn active_players(&self) -> Vec<UserId> {
        self.players.clone()
    }

    fn connected_player_position(&self, user: &str) -> Option<Vec3> {
        self.facades.get(user).map(|(facade, _)| facade.position)
    }

    fn set_avatar_world_pose(&mut self, user: &str, world: Pose) -> bool {
        let Some(&(facade, Some(avatar))) = self.facades.get(user) else {
            return false;
        };
        self.writes.push((avatar, facade.inverse().mul_pose(&world)));
        true
    }
}

struct EcsOutro {
    entity: Entity,
    parent_world: Pose,
    local: Option<Pose>,
}

impl OutroAnchor for EcsOutro {
    fn set_world_pose(&mut self, world: Pose) {
        self.local = Some(self.parent_world.inverse().mul_pose(&world));
    }
}

/// Copies the root's world pose onto remote avatars and the outro anchor.
/// Runs only on frames where the root composed. World poses come from the
/// current `Transform` hierarchy, so parents moved earlier this frame count.
pub fn mirror_root_pose_system(world: &mut World) {
    let Some(root_local) = world
        .get_resource::<PendingPoses>()
        .and_then(|p| p.outputs.root())
    else {
        return;
    };
    let Some(root_entity) = world
        .get_resource::<PlayerTargets>()
        .and_then(|index| index.map.get(&PlayerObject::Root).copied())
    else {
        return;
    };
    let root_world = parent_world(world, root_entity).mul_pose(&root_local);

    let players = world.get_resource::<ActivePlayers>().map(|p| p.0.clone());
    let mut session = players.map(|players| EcsSession::capture(world, players));

    let outro_entity = {
        let mut q = world.query_filtered::<Entity, With<OutroSequenceAnchor>>();
        let found = q.iter(world).next();
        found
    };
    let mut outro = outro_entity.map(|entity| EcsOutro {
        entity,
        parent_world: parent_world(world, entity),
        local: None,
    });

    let report = match world.get_resource_mut::<PlayerTrackDispatcher>() {
        Some(mut dispatcher) => dispatcher.0.mirror_root(
            root_world,
            session.as_mut().map(|s| s as &mut dyn MultiplayerSession),
            outro.as_mut().map(|o| o as &mut dyn OutroAnchor),
        ),
        None => return,
    };
    if let Some(report) = report {
        trace!(
            "player track: mirrored {} avatars ({} skipped)",
            report.avatars_mirrored,
            report.avatars_skipped
        );
    }

    if let Some(session) = session {
        for (avatar, local) in session.writes {
            write_local(world, avatar, local);
        }
    }
    if let Some(EcsOutro {
        entity,
        local: Some(local),
        ..
    }) = outro
    {
        write_local(world, entity, local);
    }
}

/// Camera proxies copy their parent's local pose.
pub fn sync_camera_proxies_system(
    mut proxies: Query<(&Parent, &mut Transform), With<CameraTrackingProxy>>,
    parents: Query<&Transform, Without<CameraTrackingProxy>>,
) {
    for (parent, mut tf) in proxies.iter_mut() {
        if let Ok(source) = parents.get(parent.get()) {
            tf.translation = source.translation;
            tf.rotation = source.rotation;
        }
    }
}

/// Destroys every compositor and its camera proxies when the session ends.
pub fn teardown_system(world: &mut World) {
    let requested = world
        .get_resource_mut::<StagedEvents>()
        .is_some_and(|mut staged| std::mem::take(&mut staged.teardown));
    if !requested {
        return;
    }
    if world.contains_resource::<PlayerTrackDispatcher>() && world.contains_resource::<Tracks>() {
        world.resource_scope(|world, mut dispatcher: Mut<PlayerTrackDispatcher>| {
            let mut tracks = world.resource_mut::<Tracks>();
            dispatcher.0.teardown(&mut tracks.0);
        });
    }
    if let Some(mut pending) = world.get_resource_mut::<PendingPoses>() {
        pending.outputs.clear();
    }

    let mut q = world.query_filtered::<Entity, With<CameraTrackingProxy>>();
    let proxies: Vec<Entity> = q.iter(world).collect();
    for proxy in proxies {
        world.entity_mut(proxy).despawn_recursive();
    }
    info!("player track: session torn down");
}
