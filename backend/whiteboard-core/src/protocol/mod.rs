//! The protocol state machine that turns channel events into verdicts.
//!
//! - [`machine`]: states, transitions, rendering and side-effect triggers
//! - [`wire`]: the JSON frames on the realtime channel
//! - [`actor`]: runs a machine on one task and hands out a cloneable handle

pub mod actor;
pub mod machine;
pub mod wire;

pub use actor::{WhiteboardHandle, spawn};
pub use machine::{ChannelState, Command, MachineSettings, ProtocolStateMachine, SessionState};
