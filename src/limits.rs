//! Static safety limits, enforced at the engine and wire boundaries.

/// Longest accepted location, room, or reservation name.
pub const MAX_NAME_LEN: usize = 128;

/// Locations a single registry will hold.
pub const MAX_LOCATIONS: usize = 1024;

/// Rooms a single location will hold.
pub const MAX_ROOMS_PER_LOCATION: usize = 4096;

/// Total rooms a single request may ask for across all classes.
pub const MAX_ROOMS_PER_REQUEST: u32 = 256;

/// Longest stay in calendar days, endpoints included.
pub const MAX_STAY_DAYS: i64 = 3650;

/// Longest accepted wire line (one JSON request).
pub const MAX_LINE_LEN: usize = 64 * 1024;
