//! Parsing and applying inbound control frames.
//!
//! Each observer connection owns a [`CommandProcessor`]. A frame that parses
//! to a [`Command`] is applied through the shared
//! [`Simulation`](crate::simulation::Simulation) and broadcast to every
//! observer. Anything else is counted, logged at `debug`, and dropped; the
//! sender gets no reply.

use std::sync::Arc;

use geopolitics_types::{Command, GameSpeed};
use serde_json::Value;
use tracing::debug;

use crate::simulation::{PublishError, Simulation};

/// Why a frame was not applied.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The frame is not JSON.
    #[error("malformed frame: {source}")]
    Malformed {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },

    /// The frame is JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The object has no string `action`.
    #[error("frame has no action")]
    MissingAction,

    /// The `action` is not one the engine understands.
    #[error("unknown action {action:?}")]
    UnknownAction {
        /// The rejected action.
        action: String,
    },

    /// `set_speed` without a recognised `speed`.
    #[error("invalid speed {speed}")]
    InvalidSpeed {
        /// The rejected value, as JSON.
        speed: String,
    },

    /// The command was applied but its broadcast failed.
    #[error("broadcast failed: {source}")]
    Publish {
        /// The underlying publish error.
        #[from]
        source: PublishError,
    },
}

/// Parse one inbound frame into a [`Command`].
///
/// Unknown fields are ignored.
///
/// # Errors
///
/// Returns the [`CommandError`] variant describing why the frame is not a
/// command.
pub fn parse_command(frame: &str) -> Result<Command, CommandError> {
    let value: Value = serde_json::from_str(frame)?;
    let object = value.as_object().ok_or(CommandError::NotAnObject)?;
    let action = object
        .get("action")
        .and_then(Value::as_str)
        .ok_or(CommandError::MissingAction)?;

    match action {
        "pause" => Ok(Command::Pause),
        "resume" => Ok(Command::Resume),
        "set_speed" => {
            let raw = object.get("speed");
            raw.and_then(Value::as_str)
                .and_then(GameSpeed::parse)
                .map(|speed| Command::SetSpeed { speed })
                .ok_or_else(|| CommandError::InvalidSpeed {
                    speed: raw.map_or_else(|| "null".to_owned(), ToString::to_string),
                })
        }
        other => Err(CommandError::UnknownAction {
            action: other.to_owned(),
        }),
    }
}

/// Applies frames from one connection to the shared simulation.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    sim: Arc<Simulation>,
}

impl CommandProcessor {
    /// Create a processor bound to `sim`.
    pub const fn new(sim: Arc<Simulation>) -> Self {
        Self { sim }
    }

    /// Parse and apply `frame`, reporting why it was not applied.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the frame is not a command or its
    /// broadcast failed.
    pub async fn apply_frame(&self, frame: &str) -> Result<Command, CommandError> {
        let command = parse_command(frame)?;
        self.sim.apply_command(command).await?;
        Ok(command)
    }

    /// Apply `frame`, swallowing and counting every rejection.
    pub async fn handle_frame(&self, frame: &str) -> Option<Command> {
        match self.apply_frame(frame).await {
            Ok(command) => Some(command),
            Err(error) => {
                self.sim.stats().record_rejected();
                debug!(error = %error, "Command frame ignored");
                None
            }
        }
    }
}
