use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Reservation id or location name that does not exist.
    NotFound(String),
    /// Reservation id or room name already in use.
    AlreadyExists(String),
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    /// No single location can satisfy the requested counts over the
    /// requested range. The expected rejection outcome, not a fault.
    Unfulfillable,
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(name) => write!(f, "not found: {name}"),
            EngineError::AlreadyExists(name) => write!(f, "already exists: {name}"),
            EngineError::InvalidRange { start, end } => {
                write!(f, "invalid range: {start} is after {end}")
            }
            EngineError::Unfulfillable => write!(f, "no location can fulfill the request"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
