use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive calendar-date range `[start, end]` — no time-of-day component.
/// A one-day stay has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "DateRange start must not be after end");
        Self { start, end }
    }

    /// Inclusive overlap test: two ranges collide when they share at least
    /// one calendar day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns true if `self` fully contains `other`.
    #[allow(dead_code)]
    pub fn contains(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of calendar days covered, endpoints included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Capacity class of a room. Demand is matched strictly within a class:
/// a large room never stands in for a small one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomClass {
    Small,
    Medium,
    Large,
}

impl RoomClass {
    pub const ALL: [RoomClass; 3] = [RoomClass::Small, RoomClass::Medium, RoomClass::Large];
}

impl std::fmt::Display for RoomClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomClass::Small => write!(f, "small"),
            RoomClass::Medium => write!(f, "medium"),
            RoomClass::Large => write!(f, "large"),
        }
    }
}

/// Room counts per class, used both for demand and for availability tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCounts {
    #[serde(default)]
    pub small: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub large: u32,
}

impl RoomCounts {
    pub fn new(small: u32, medium: u32, large: u32) -> Self {
        Self { small, medium, large }
    }

    pub fn get(&self, class: RoomClass) -> u32 {
        match class {
            RoomClass::Small => self.small,
            RoomClass::Medium => self.medium,
            RoomClass::Large => self.large,
        }
    }

    fn get_mut(&mut self, class: RoomClass) -> &mut u32 {
        match class {
            RoomClass::Small => &mut self.small,
            RoomClass::Medium => &mut self.medium,
            RoomClass::Large => &mut self.large,
        }
    }

    pub fn bump(&mut self, class: RoomClass) {
        *self.get_mut(class) += 1;
    }

    /// Consume one unit of demand for `class`. Returns false when that
    /// class's demand is already met.
    pub fn take(&mut self, class: RoomClass) -> bool {
        let slot = self.get_mut(class);
        if *slot > 0 {
            *slot -= 1;
            true
        } else {
            false
        }
    }

    /// True iff every class count in `demand` is met or exceeded by `self`.
    pub fn covers(&self, demand: &RoomCounts) -> bool {
        RoomClass::ALL.iter().all(|&c| self.get(c) >= demand.get(c))
    }

    pub fn total(&self) -> u32 {
        self.small + self.medium + self.large
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// One reservation's claim on a single room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    pub reservation_id: String,
    pub range: DateRange,
}

/// A bookable room. Owns the set of occupancies currently placed on it and
/// answers availability queries over a date range.
#[derive(Debug, Clone)]
pub struct Room {
    pub name: String,
    pub class: RoomClass,
    /// Insertion order preserved; listings sort a copy by start date.
    occupancies: Vec<Occupancy>,
}

impl Room {
    pub fn new(name: impl Into<String>, class: RoomClass) -> Self {
        Self {
            name: name.into(),
            class,
            occupancies: Vec::new(),
        }
    }

    /// True when no occupancy overlaps the candidate range.
    pub fn is_available(&self, range: &DateRange) -> bool {
        self.occupancies.iter().all(|o| !o.range.overlaps(range))
    }

    pub fn occupancies(&self) -> &[Occupancy] {
        &self.occupancies
    }

    /// Occupancies ordered by start date ascending. The sort is stable, so
    /// equal start dates keep their original insertion order.
    pub fn occupancies_by_start(&self) -> Vec<&Occupancy> {
        let mut ordered: Vec<&Occupancy> = self.occupancies.iter().collect();
        ordered.sort_by_key(|o| o.range.start);
        ordered
    }

    pub(crate) fn attach(&mut self, reservation_id: &str, range: DateRange) {
        self.occupancies.push(Occupancy {
            reservation_id: reservation_id.to_string(),
            range,
        });
    }

    pub(crate) fn detach(&mut self, reservation_id: &str) {
        self.occupancies.retain(|o| o.reservation_id != reservation_id);
    }
}

/// A named collection of rooms. Owns its rooms exclusively and answers
/// aggregate capacity and availability queries across them.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: String,
    rooms: Vec<Room>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rooms: Vec::new(),
        }
    }

    pub(crate) fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    pub(crate) fn room_mut(&mut self, name: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.name == name)
    }

    /// Rooms in declaration order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Rooms free over `range`, in declaration order.
    pub fn available_rooms(&self, range: &DateRange) -> Vec<&Room> {
        self.rooms.iter().filter(|r| r.is_available(range)).collect()
    }

    /// Pure aggregate query: can this location alone meet `demand` over
    /// `range`? Counts available rooms per class and compares.
    pub fn has_capacity(&self, range: &DateRange, demand: &RoomCounts) -> bool {
        let mut free = RoomCounts::default();
        for room in self.available_rooms(range) {
            free.bump(room.class);
        }
        free.covers(demand)
    }
}

/// An allocated reservation. Created only by a successful allocation, fully
/// populated or not at all, and replaced wholesale on modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: String,
    pub range: DateRange,
    /// Name of the fulfilling location.
    pub location: String,
    /// Assigned room names, in selection order.
    pub rooms: Vec<String>,
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyInfo {
    pub id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListing {
    pub room: String,
    pub class: RoomClass,
    /// Ordered by start date ascending, stable on ties.
    pub reservations: Vec<OccupancyInfo>,
}
