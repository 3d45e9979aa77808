//! Client ⇄ upstream frame relay.
//!
//! A relay owns exactly two legs and no shared state. Frames are forwarded
//! verbatim and in order in each direction; the relay ends when either leg
//! ends and always closes the other.

mod error;
mod frame;
mod pump;

pub use error::{RelayError, RelayResult};
pub use frame::{CLOSE_INTERNAL_ERROR, CloseInfo, Frame, RelayMessage};
pub use pump::{EndReason, Leg, RelayOutcome, relay};
