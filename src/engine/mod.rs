mod availability;
mod error;
mod mutations;
mod queries;

pub use availability::Availability;
pub use error::EngineError;

use std::collections::HashMap;

use crate::model::*;

/// All locations known to the system, in registration order. The allocation
/// scan walks this order and commits to the first satisfying location, so
/// the order is load-bearing.
#[derive(Debug, Default)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub(super) fn get_mut(&mut self, name: &str) -> Option<&mut Location> {
        self.locations.iter_mut().find(|l| l.name == name)
    }

    /// Existing location, or a freshly registered empty one.
    pub(super) fn get_or_create(&mut self, name: &str) -> &mut Location {
        if let Some(pos) = self.locations.iter().position(|l| l.name == name) {
            return &mut self.locations[pos];
        }
        self.locations.push(Location::new(name));
        self.locations.last_mut().expect("location just pushed")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// The reservation engine: owns the location registry and the index of
/// active reservations, and is the only writer of either. All methods are
/// synchronous in-memory operations; callers that share an engine across
/// tasks serialize access around it (see `wire`).
#[derive(Debug, Default)]
pub struct Engine {
    registry: LocationRegistry,
    reservations: HashMap<String, Reservation>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn reservation(&self, id: &str) -> Option<&Reservation> {
        self.reservations.get(id)
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    /// Link a reservation into each of its assigned rooms. The reservation
    /// was built against this registry, so every named room must exist; a
    /// miss is an engine bug, not caller error.
    pub(super) fn attach(&mut self, reservation: &Reservation) {
        let location = self
            .registry
            .get_mut(&reservation.location)
            .expect("reservation references unknown location");
        for room_name in &reservation.rooms {
            location
                .room_mut(room_name)
                .expect("reservation references unknown room")
                .attach(&reservation.id, reservation.range);
        }
    }

    /// Remove a reservation's linkage from each of its assigned rooms.
    pub(super) fn detach(&mut self, reservation: &Reservation) {
        let location = self
            .registry
            .get_mut(&reservation.location)
            .expect("reservation references unknown location");
        for room_name in &reservation.rooms {
            location
                .room_mut(room_name)
                .expect("reservation references unknown room")
                .detach(&reservation.id);
        }
    }

    /// Attach and index a reservation, returning a borrow of the stored
    /// record. Single commit path for both `allocate` and the `modify`
    /// rollback, so linkage and index can never diverge.
    pub(super) fn commit(&mut self, reservation: Reservation) -> &Reservation {
        self.attach(&reservation);
        let id = reservation.id.clone();
        self.reservations.insert(id.clone(), reservation);
        &self.reservations[&id]
    }
}
