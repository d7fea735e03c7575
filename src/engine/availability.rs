use crate::model::*;

// ── Availability snapshot ─────────────────────────────────────────

/// Free rooms of one location for one date range, captured in a single scan.
///
/// The aggregate capacity check and the per-room selection both read this
/// snapshot, so a location that passes the check can never fail selection:
/// there is no re-query between the two steps.
#[derive(Debug, Clone)]
pub struct Availability {
    /// (room name, class) for every free room, in declaration order.
    free: Vec<(String, RoomClass)>,
}

impl Availability {
    pub fn capture(location: &Location, range: &DateRange) -> Self {
        let free = location
            .available_rooms(range)
            .into_iter()
            .map(|r| (r.name.clone(), r.class))
            .collect();
        Self { free }
    }

    /// Per-class tally of the captured free rooms.
    pub fn counts(&self) -> RoomCounts {
        let mut counts = RoomCounts::default();
        for (_, class) in &self.free {
            counts.bump(*class);
        }
        counts
    }

    /// True iff every requested class count is met or exceeded.
    pub fn satisfies(&self, demand: &RoomCounts) -> bool {
        self.counts().covers(demand)
    }

    /// First-fit greedy selection: walk the free rooms in declaration order,
    /// assign each room whose class still has unmet demand, stop when all
    /// demands reach zero. Callers check `satisfies` first; running dry here
    /// would mean the snapshot disagreed with itself.
    pub fn select(&self, demand: &RoomCounts) -> Vec<String> {
        let mut remaining = *demand;
        let mut assigned = Vec::with_capacity(demand.total() as usize);

        for (name, class) in &self.free {
            if remaining.is_zero() {
                break;
            }
            if remaining.take(*class) {
                assigned.push(name.clone());
            }
        }

        debug_assert!(
            remaining.is_zero(),
            "selection ran dry on a snapshot that satisfied the demand"
        );
        assigned
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn location() -> Location {
        let mut loc = Location::new("HQ");
        loc.add_room(Room::new("S1", RoomClass::Small));
        loc.add_room(Room::new("M1", RoomClass::Medium));
        loc.add_room(Room::new("S2", RoomClass::Small));
        loc.add_room(Room::new("L1", RoomClass::Large));
        loc
    }

    #[test]
    fn capture_counts_per_class() {
        let loc = location();
        let snap = Availability::capture(&loc, &DateRange::new(d(2024, 1, 1), d(2024, 1, 2)));
        assert_eq!(snap.len(), 4);
        assert_eq!(snap.counts(), RoomCounts::new(2, 1, 1));
    }

    #[test]
    fn capture_excludes_occupied() {
        let mut loc = location();
        loc.room_mut("S1")
            .unwrap()
            .attach("r1", DateRange::new(d(2024, 1, 1), d(2024, 1, 5)));

        let snap = Availability::capture(&loc, &DateRange::new(d(2024, 1, 4), d(2024, 1, 6)));
        assert_eq!(snap.counts(), RoomCounts::new(1, 1, 1));

        let snap = Availability::capture(&loc, &DateRange::new(d(2024, 1, 6), d(2024, 1, 8)));
        assert_eq!(snap.counts(), RoomCounts::new(2, 1, 1));
    }

    #[test]
    fn satisfies_is_per_class() {
        let loc = location();
        let snap = Availability::capture(&loc, &DateRange::new(d(2024, 1, 1), d(2024, 1, 2)));
        assert!(snap.satisfies(&RoomCounts::new(2, 1, 1)));
        assert!(snap.satisfies(&RoomCounts::new(1, 0, 0)));
        assert!(!snap.satisfies(&RoomCounts::new(3, 0, 0)));
        assert!(!snap.satisfies(&RoomCounts::new(0, 2, 0)));
    }

    #[test]
    fn select_first_fit_in_declaration_order() {
        let loc = location();
        let snap = Availability::capture(&loc, &DateRange::new(d(2024, 1, 1), d(2024, 1, 2)));

        assert_eq!(snap.select(&RoomCounts::new(1, 0, 0)), vec!["S1"]);
        assert_eq!(snap.select(&RoomCounts::new(2, 0, 0)), vec!["S1", "S2"]);
        // Selection order follows room declaration order, not class order.
        assert_eq!(
            snap.select(&RoomCounts::new(1, 1, 1)),
            vec!["S1", "M1", "L1"]
        );
    }

    #[test]
    fn select_zero_demand_assigns_nothing() {
        let loc = location();
        let snap = Availability::capture(&loc, &DateRange::new(d(2024, 1, 1), d(2024, 1, 2)));
        assert!(snap.select(&RoomCounts::default()).is_empty());
    }
}
