//! Tracks and the store that owns them.
//!
//! A track is a named bag of property values. The interpolation engine that
//! keeps those values current lives outside this crate; it writes into the
//! track through [`Track::set_property`] before the frame is composed.
//! Compositors never own tracks: they hold a [`TrackId`] and register
//! themselves on the track they read from.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{PlayerTrackError, Result};
use crate::ids::{IdAllocator, PlayerObject, TrackId};
use crate::value::PropertyValue;

/// Read side of a track: the current value of a property, or `None` when the
/// property is not animated (or is animated with a different type).
pub trait PropertySource {
    fn vec3(&self, name: &str) -> Option<Vec3>;
    fn quat(&self, name: &str) -> Option<Quat>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    properties: BTreeMap<String, PropertyValue>,
    /// Player objects currently reading from this track.
    #[serde(skip)]
    attached: Vec<PlayerObject>,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style property setter, handy for fixtures and tests.
    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(name.to_string(), value.into());
    }

    /// Mark a property as no longer animated.
    pub fn clear_property(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.remove(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Register a reader. Returns false if it was already registered.
    pub fn attach(&mut self, target: PlayerObject) -> bool {
        if self.attached.contains(&target) {
            return false;
        }
        self.attached.push(target);
        true
    }

    /// Deregister a reader. Returns false if it was not registered.
    pub fn detach(&mut self, target: PlayerObject) -> bool {
        let before = self.attached.len();
        self.attached.retain(|t| *t != target);
        self.attached.len() != before
    }

    pub fn attached(&self) -> &[PlayerObject] {
        &self.attached
    }

    pub fn is_attached(&self, target: PlayerObject) -> bool {
        self.attached.contains(&target)
    }
}

impl PropertySource for Track {
    fn vec3(&self, name: &str) -> Option<Vec3> {
        self.properties.get(name).and_then(PropertyValue::as_vec3)
    }

    fn quat(&self, name: &str) -> Option<Quat> {
        self.properties.get(name).and_then(PropertyValue::as_quat)
    }
}

/// Owner of every track in the session, addressable by id or by name.
#[derive(Default, Debug)]
pub struct TrackStore {
    ids: IdAllocator,
    items: Vec<(TrackId, Track)>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a track. A track with the same name is replaced in place: the id
    /// and its attached readers survive, the property values do not.
    pub fn insert(&mut self, track: Track) -> TrackId {
        if let Some((id, existing)) = self.items.iter_mut().find(|(_, t)| t.name == track.name) {
            existing.properties = track.properties;
            return *id;
        }
        let id = self.ids.alloc_track();
        self.items.push((id, track));
        id
    }

    /// Return the id of the named track, creating an empty one if needed.
    pub fn get_or_insert(&mut self, name: &str) -> TrackId {
        match self.id_of(name) {
            Some(id) => id,
            None => self.insert(Track::new(name)),
        }
    }

    /// Parse a JSON track document (`{ "name": ..., "properties": { ... } }`).
    pub fn insert_json(&mut self, s: &str) -> Result<TrackId> {
        let track: Track = serde_json::from_str(s)?;
        Ok(self.insert(track))
    }

    pub fn remove(&mut self, id: TrackId) -> Option<Track> {
        let idx = self.items.iter().position(|(tid, _)| *tid == id)?;
        Some(self.items.remove(idx).1)
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.items
            .iter()
            .find_map(|(tid, t)| if *tid == id { Some(t) } else { None })
    }

    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.items
            .iter_mut()
            .find_map(|(tid, t)| if *tid == id { Some(t) } else { None })
    }

    pub fn id_of(&self, name: &str) -> Option<TrackId> {
        self.items
            .iter()
            .find_map(|(tid, t)| if t.name == name { Some(*tid) } else { None })
    }

    /// Resolve a track name, failing when it is not registered.
    pub fn resolve(&self, name: &str) -> Result<TrackId> {
        self.id_of(name).ok_or_else(|| PlayerTrackError::TrackNotFound {
            name: name.to_string(),
        })
    }

    pub fn attach(&mut self, id: TrackId, target: PlayerObject) -> bool {
        self.get_mut(id).is_some_and(|t| t.attach(target))
    }

    pub fn detach(&mut self, id: TrackId, target: PlayerObject) -> bool {
        self.get_mut(id).is_some_and(|t| t.detach(target))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &Track)> {
        self.items.iter().map(|(id, t)| (*id, t))
    }
}
