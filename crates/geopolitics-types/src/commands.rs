//! Control commands sent by observers over their persistent connection.
//!
//! The wire shape is a JSON object tagged by `action`:
//!
//! ```json
//! {"action": "pause"}
//! {"action": "resume"}
//! {"action": "set_speed", "speed": "fast"}
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::GameSpeed;

/// A recognised control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Command {
    /// Stop advancing the calendar.
    Pause,
    /// Continue advancing the calendar at the current speed.
    Resume,
    /// Change the tick frequency multiplier.
    SetSpeed {
        /// The new speed.
        speed: GameSpeed,
    },
}

impl Command {
    /// Wire name of the command's `action` tag.
    pub const fn action(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::SetSpeed { .. } => "set_speed",
        }
    }
}
