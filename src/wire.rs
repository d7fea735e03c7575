use std::sync::Arc;

use chrono::NaiveDate;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};

use crate::engine::{Engine, EngineError};
use crate::limits::MAX_LINE_LEN;
use crate::model::{Reservation, RoomClass, RoomCounts, RoomListing};
use crate::observability;

/// One engine instance shared across connections. Mutations take the write
/// lock, so allocate's read-then-assign sequence is atomic relative to every
/// other mutation (the engine itself is not safe under concurrent writers).
pub type SharedEngine = Arc<RwLock<Engine>>;

// ── Requests ─────────────────────────────────────────────────────

/// One request line, tagged by `command`. Count fields default to zero when
/// omitted.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Command {
    Room {
        location: String,
        room: String,
        size: RoomClass,
    },
    Request {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
        #[serde(default)]
        small: u32,
        #[serde(default)]
        medium: u32,
        #[serde(default)]
        large: u32,
    },
    Change {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
        #[serde(default)]
        small: u32,
        #[serde(default)]
        medium: u32,
        #[serde(default)]
        large: u32,
    },
    Cancel {
        id: String,
    },
    List {
        location: String,
    },
}

// ── Replies ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Rejected,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ReservationEntry {
    pub id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct RoomEntry {
    pub room: String,
    pub reservations: Vec<ReservationEntry>,
}

/// One reply line. Untagged: each shape carries its own `status` field.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Booked {
        status: Status,
        location: String,
        rooms: Vec<String>,
    },
    Listing {
        status: Status,
        rooms: Vec<RoomEntry>,
    },
    Fault {
        status: Status,
        error: String,
    },
    Plain {
        status: Status,
    },
}

impl Reply {
    fn success() -> Self {
        Reply::Plain { status: Status::Success }
    }

    fn rejected() -> Self {
        Reply::Plain { status: Status::Rejected }
    }

    fn error(err: impl std::fmt::Display) -> Self {
        Reply::Fault {
            status: Status::Error,
            error: err.to_string(),
        }
    }

    fn booked(reservation: &Reservation) -> Self {
        Reply::Booked {
            status: Status::Success,
            location: reservation.location.clone(),
            rooms: reservation.rooms.clone(),
        }
    }

    fn listing(rooms: Vec<RoomListing>) -> Self {
        Reply::Listing {
            status: Status::Success,
            rooms: rooms
                .into_iter()
                .map(|l| RoomEntry {
                    room: l.room,
                    reservations: l
                        .reservations
                        .into_iter()
                        .map(|r| ReservationEntry {
                            id: r.id,
                            start: r.start,
                            end: r.end,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn status(&self) -> Status {
        match self {
            Reply::Booked { status, .. }
            | Reply::Listing { status, .. }
            | Reply::Fault { status, .. }
            | Reply::Plain { status } => *status,
        }
    }

    fn status_label(&self) -> &'static str {
        match self.status() {
            Status::Success => "success",
            Status::Rejected => "rejected",
            Status::Error => "error",
        }
    }
}

// ── Dispatch ─────────────────────────────────────────────────────

/// Execute one command against the shared engine and record RED metrics.
pub async fn dispatch(engine: &SharedEngine, cmd: Command) -> Reply {
    let label = observability::command_label(&cmd);
    let started = std::time::Instant::now();

    let reply = execute(engine, cmd).await;

    metrics::histogram!(observability::REQUEST_DURATION_SECONDS, "command" => label)
        .record(started.elapsed().as_secs_f64());
    metrics::counter!(
        observability::REQUESTS_TOTAL,
        "command" => label,
        "status" => reply.status_label()
    )
    .increment(1);
    reply
}

async fn execute(engine: &SharedEngine, cmd: Command) -> Reply {
    match cmd {
        Command::Room { location, room, size } => {
            match engine.write().await.register_room(&location, &room, size) {
                Ok(()) => {
                    tracing::debug!(%location, %room, class = %size, "room registered");
                    Reply::success()
                }
                Err(e) => Reply::error(e),
            }
        }
        Command::Request { id, start, end, small, medium, large } => {
            let counts = RoomCounts::new(small, medium, large);
            let mut guard = engine.write().await;
            let outcome = guard
                .allocate(&id, start, end, counts)
                .map(|r| Reply::booked(r));
            match outcome {
                Ok(reply) => {
                    metrics::gauge!(observability::RESERVATIONS_ACTIVE)
                        .set(guard.reservation_count() as f64);
                    reply
                }
                Err(EngineError::Unfulfillable) => {
                    metrics::counter!(observability::ALLOCATIONS_REJECTED_TOTAL).increment(1);
                    tracing::debug!(%id, "allocation rejected: no fulfilling location");
                    Reply::rejected()
                }
                Err(e) => Reply::error(e),
            }
        }
        Command::Change { id, start, end, small, medium, large } => {
            let counts = RoomCounts::new(small, medium, large);
            let mut guard = engine.write().await;
            let outcome = guard.modify(&id, start, end, counts).map(|r| Reply::booked(r));
            match outcome {
                Ok(reply) => reply,
                // Unknown ids and unmet demand both read as a rejected
                // change; the original reservation is intact either way.
                Err(EngineError::Unfulfillable) => {
                    metrics::counter!(observability::ALLOCATIONS_REJECTED_TOTAL).increment(1);
                    tracing::debug!(%id, "modification rejected, original preserved");
                    Reply::rejected()
                }
                Err(EngineError::NotFound(_)) => Reply::rejected(),
                Err(e) => Reply::error(e),
            }
        }
        Command::Cancel { id } => {
            let mut guard = engine.write().await;
            match guard.cancel(&id) {
                Ok(()) => {
                    metrics::gauge!(observability::RESERVATIONS_ACTIVE)
                        .set(guard.reservation_count() as f64);
                    Reply::success()
                }
                Err(EngineError::NotFound(_)) => Reply::rejected(),
                Err(e) => Reply::error(e),
            }
        }
        Command::List { location } => match engine.read().await.list_rooms(&location) {
            Ok(rooms) => Reply::listing(rooms),
            Err(e) => Reply::error(e),
        },
    }
}

// ── Connection loops ─────────────────────────────────────────────

/// Serve one TCP connection: one JSON request per line, one JSON reply per
/// line. Blank lines are skipped; malformed requests get an error reply and
/// the connection stays open.
pub async fn process_connection(
    socket: TcpStream,
    engine: SharedEngine,
) -> Result<(), LinesCodecError> {
    let mut framed = Framed::new(socket, LinesCodec::new_with_max_length(MAX_LINE_LEN));

    while let Some(line) = framed.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Command>(&line) {
            Ok(cmd) => dispatch(&engine, cmd).await,
            Err(e) => {
                tracing::debug!("unparseable request: {e}");
                Reply::error(format!("bad request: {e}"))
            }
        };
        let encoded = serde_json::to_string(&reply).expect("reply serialization cannot fail");
        framed.send(encoded).await?;
    }
    Ok(())
}

/// The same request/reply loop over stdin/stdout, for piped use.
pub async fn process_stdio(engine: SharedEngine) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Command>(&line) {
            Ok(cmd) => dispatch(&engine, cmd).await,
            Err(e) => Reply::error(format!("bad request: {e}")),
        };
        let mut encoded = serde_json::to_string(&reply).expect("reply serialization cannot fail");
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_room_command() {
        let cmd: Command = serde_json::from_str(
            r#"{"command":"room","location":"HQ","room":"A1","size":"small"}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::Room {
                location: "HQ".into(),
                room: "A1".into(),
                size: RoomClass::Small,
            }
        );
    }

    #[test]
    fn parse_request_command_with_defaults() {
        let cmd: Command = serde_json::from_str(
            r#"{"command":"request","id":"r1","start":"2024-01-10","end":"2024-01-12","small":1}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::Request {
                id: "r1".into(),
                start: d(2024, 1, 10),
                end: d(2024, 1, 12),
                small: 1,
                medium: 0,
                large: 0,
            }
        );
    }

    #[test]
    fn invalid_size_is_a_parse_error() {
        let result = serde_json::from_str::<Command>(
            r#"{"command":"room","location":"HQ","room":"A1","size":"tiny"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_command_is_a_parse_error() {
        let result = serde_json::from_str::<Command>(r#"{"command":"teleport","id":"r1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn reply_shapes() {
        let booked = Reply::booked(&Reservation {
            id: "r1".into(),
            range: crate::model::DateRange::new(d(2024, 1, 10), d(2024, 1, 12)),
            location: "HQ".into(),
            rooms: vec!["A1".into()],
        });
        assert_eq!(
            serde_json::to_string(&booked).unwrap(),
            r#"{"status":"success","location":"HQ","rooms":["A1"]}"#
        );

        assert_eq!(
            serde_json::to_string(&Reply::rejected()).unwrap(),
            r#"{"status":"rejected"}"#
        );

        let fault = Reply::error("boom");
        assert_eq!(
            serde_json::to_string(&fault).unwrap(),
            r#"{"status":"error","error":"boom"}"#
        );
    }

    #[test]
    fn listing_reply_shape() {
        let listing = Reply::listing(vec![RoomListing {
            room: "A1".into(),
            class: RoomClass::Small,
            reservations: vec![crate::model::OccupancyInfo {
                id: "r1".into(),
                start: d(2024, 1, 10),
                end: d(2024, 1, 12),
            }],
        }]);
        assert_eq!(
            serde_json::to_string(&listing).unwrap(),
            r#"{"status":"success","rooms":[{"room":"A1","reservations":[{"id":"r1","start":"2024-01-10","end":"2024-01-12"}]}]}"#
        );
    }

    #[tokio::test]
    async fn dispatch_full_cycle() {
        let engine: SharedEngine = Arc::new(RwLock::new(Engine::new()));

        let reply = dispatch(
            &engine,
            Command::Room {
                location: "HQ".into(),
                room: "A1".into(),
                size: RoomClass::Small,
            },
        )
        .await;
        assert_eq!(reply.status(), Status::Success);

        let reply = dispatch(
            &engine,
            Command::Request {
                id: "r1".into(),
                start: d(2024, 1, 10),
                end: d(2024, 1, 12),
                small: 1,
                medium: 0,
                large: 0,
            },
        )
        .await;
        assert!(matches!(reply, Reply::Booked { .. }));

        // Same range again: capacity rejection, not an error.
        let reply = dispatch(
            &engine,
            Command::Request {
                id: "r2".into(),
                start: d(2024, 1, 10),
                end: d(2024, 1, 12),
                small: 1,
                medium: 0,
                large: 0,
            },
        )
        .await;
        assert_eq!(reply.status(), Status::Rejected);

        let reply = dispatch(&engine, Command::Cancel { id: "r1".into() }).await;
        assert_eq!(reply.status(), Status::Success);
        let reply = dispatch(&engine, Command::Cancel { id: "r1".into() }).await;
        assert_eq!(reply.status(), Status::Rejected);
    }
}
