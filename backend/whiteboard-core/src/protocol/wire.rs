//! JSON frames exchanged with the collaboration endpoint.
//!
//! Outbound: `{"action": "subscribe", "auth_token", "data": {"account_id", "binding"}}`
//! and `{"action": "collabazoo", "data": {"account_id", "command"}}`.
//!
//! Inbound: `{"status": "error", "data": ...}` or
//! `{"status": ..., "data": {"event_category", "event_name", ...}}`.

use crate::COLLAB_EVENT_CATEGORY;
use crate::error::protocol::ProtocolError;
use crate::geometry::{Point, Stroke};

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUBSCRIBE_ACTION: &str = "subscribe";
pub const CLEAR_COMMAND: &str = "clear";

const STATUS_ERROR: &str = "error";
const EVENT_DRAW: &str = "draw";
const EVENT_CLEAR: &str = "clear";

#[derive(Debug, Serialize)]
pub struct SubscribePayload<'a> {
    pub auth_token: &'a str,
    pub data: SubscribeData<'a>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeData<'a> {
    pub account_id: &'a str,
    pub binding: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CollabCommandPayload<'a> {
    pub data: CollabCommandData<'a>,
}

#[derive(Debug, Serialize)]
pub struct CollabCommandData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<&'a str>,
    pub command: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Body of a `draw` event.
#[derive(Debug, Clone, Deserialize)]
pub struct DrawEvent {
    /// Colour the drawer picked. Informational only; rendering uses the verdict colour.
    #[serde(default, alias = "color")]
    pub rgb: Option<Value>,
    pub points: Vec<Point>,
    #[serde(alias = "pointSize")]
    pub point_size: f64,
}

impl DrawEvent {
    pub fn into_stroke(self) -> Stroke {
        Stroke::new(self.points, self.point_size)
    }
}

#[derive(Debug, Clone)]
pub enum Inbound {
    /// The server flagged the frame as an error. Fatal to the session.
    ErrorStatus(Value),
    Draw(DrawEvent),
    Clear,
    /// Well-formed but not a whiteboard event we act on.
    Ignored { category: String, name: String },
}

/// Parse one inbound text frame.
///
/// # Errors
///
/// - [`ProtocolError::Parse`] if the frame is not JSON
/// - [`ProtocolError::Shape`] if the event envelope or a draw body is malformed
#[track_caller]
pub fn parse_inbound(raw: &str) -> Result<Inbound, ProtocolError> {
    let location = ErrorLocation::from(Location::caller());
    let frame: RawFrame = serde_json::from_str(raw)?;

    if frame.status.as_deref() == Some(STATUS_ERROR) {
        return Ok(Inbound::ErrorStatus(frame.data));
    }

    let category = envelope_field(&frame.data, "event_category")?;
    let name = envelope_field(&frame.data, "event_name")?;

    if category != COLLAB_EVENT_CATEGORY {
        return Ok(Inbound::Ignored { category, name });
    }

    match name.as_str() {
        EVENT_DRAW => {
            let draw: DrawEvent =
                serde_json::from_value(frame.data).map_err(|e| ProtocolError::Shape {
                    message: format!("malformed draw event: {e}"),
                    location,
                })?;
            Ok(Inbound::Draw(draw))
        }
        EVENT_CLEAR => Ok(Inbound::Clear),
        _ => Ok(Inbound::Ignored { category, name }),
    }
}

#[track_caller]
fn envelope_field(data: &Value, field: &str) -> Result<String, ProtocolError> {
    let location = ErrorLocation::from(Location::caller());
    data.get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ProtocolError::Shape {
            message: format!("event is missing '{field}'"),
            location,
        })
}
