use crate::model::*;

use super::{Engine, EngineError};

impl Engine {
    /// Every room of a location together with its occupying reservations,
    /// ordered by start date ascending (stable on ties). Pure query.
    pub fn list_rooms(&self, location: &str) -> Result<Vec<RoomListing>, EngineError> {
        let loc = self
            .registry
            .get(location)
            .ok_or_else(|| EngineError::NotFound(location.to_string()))?;

        Ok(loc
            .rooms()
            .iter()
            .map(|room| RoomListing {
                room: room.name.clone(),
                class: room.class,
                reservations: room
                    .occupancies_by_start()
                    .into_iter()
                    .map(|o| OccupancyInfo {
                        id: o.reservation_id.clone(),
                        start: o.range.start,
                        end: o.range.end,
                    })
                    .collect(),
            })
            .collect())
    }

    /// Names of all registered locations, in registration order.
    pub fn location_names(&self) -> Vec<&str> {
        self.registry.iter().map(|l| l.name.as_str()).collect()
    }
}
