use chrono::NaiveDate;

use crate::limits::*;
use crate::model::*;

use super::availability::Availability;
use super::{Engine, EngineError};

/// Shared request validation for allocate and modify. Pure, touches no
/// state, so a failure here can never strand a detached reservation.
fn validate_request(
    start: NaiveDate,
    end: NaiveDate,
    counts: &RoomCounts,
) -> Result<DateRange, EngineError> {
    if start > end {
        return Err(EngineError::InvalidRange { start, end });
    }
    let range = DateRange::new(start, end);
    if range.days() > MAX_STAY_DAYS {
        return Err(EngineError::LimitExceeded("stay too long"));
    }
    if counts.total() > MAX_ROOMS_PER_REQUEST {
        return Err(EngineError::LimitExceeded("too many rooms requested"));
    }
    Ok(range)
}

impl Engine {
    /// Add a room to a location, creating the location on first mention.
    /// Room names are unique within their location.
    pub fn register_room(
        &mut self,
        location: &str,
        room: &str,
        class: RoomClass,
    ) -> Result<(), EngineError> {
        if location.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("location name too long"));
        }
        if room.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("room name too long"));
        }
        if self.registry.get(location).is_none() && self.registry.len() >= MAX_LOCATIONS {
            return Err(EngineError::LimitExceeded("too many locations"));
        }

        let loc = self.registry.get_or_create(location);
        if loc.room(room).is_some() {
            return Err(EngineError::AlreadyExists(room.to_string()));
        }
        if loc.rooms().len() >= MAX_ROOMS_PER_LOCATION {
            return Err(EngineError::LimitExceeded("too many rooms in location"));
        }
        loc.add_room(Room::new(room, class));
        Ok(())
    }

    /// Allocate rooms for a new reservation. Scans locations in registration
    /// order and commits to the first whose snapshot satisfies the demand;
    /// locations are never combined. A rejection mutates nothing.
    pub fn allocate(
        &mut self,
        id: &str,
        start: NaiveDate,
        end: NaiveDate,
        counts: RoomCounts,
    ) -> Result<&Reservation, EngineError> {
        if id.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("reservation id too long"));
        }
        let range = validate_request(start, end, &counts)?;
        if self.reservations.contains_key(id) {
            return Err(EngineError::AlreadyExists(id.to_string()));
        }

        let reservation = self.try_allocate(id, range, &counts)?;
        Ok(self.commit(reservation))
    }

    /// The allocation scan, free of side effects: either a fully populated
    /// reservation or `Unfulfillable`, with no state touched either way.
    fn try_allocate(
        &self,
        id: &str,
        range: DateRange,
        counts: &RoomCounts,
    ) -> Result<Reservation, EngineError> {
        for location in self.registry.iter() {
            // One snapshot per location feeds both the capacity check and
            // the room selection.
            let snapshot = Availability::capture(location, &range);
            if snapshot.satisfies(counts) {
                let rooms = snapshot.select(counts);
                return Ok(Reservation {
                    id: id.to_string(),
                    range,
                    location: location.name.clone(),
                    rooms,
                });
            }
        }
        Err(EngineError::Unfulfillable)
    }

    /// Re-allocate an existing reservation with new parameters. Atomic from
    /// the caller's perspective: on failure the original record is restored
    /// exactly — same id, dates, location, and rooms.
    pub fn modify(
        &mut self,
        id: &str,
        start: NaiveDate,
        end: NaiveDate,
        counts: RoomCounts,
    ) -> Result<&Reservation, EngineError> {
        let range = validate_request(start, end, &counts)?;
        let prior = self
            .reservations
            .remove(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        self.detach(&prior);

        // The prior record is the rollback snapshot: try the new shape, and
        // recommit the snapshot untouched if it cannot be met.
        match self.try_allocate(id, range, &counts) {
            Ok(fresh) => Ok(self.commit(fresh)),
            Err(err) => {
                self.commit(prior);
                Err(err)
            }
        }
    }

    /// Drop a reservation, detaching it from every room it occupies. Other
    /// reservations are unaffected.
    pub fn cancel(&mut self, id: &str) -> Result<(), EngineError> {
        let prior = self
            .reservations
            .remove(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        self.detach(&prior);
        Ok(())
    }
}
