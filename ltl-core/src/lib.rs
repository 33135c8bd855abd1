#![cfg_attr(not(test), no_std)]

//! The Lower Transport Layer engine: replay protection, reassembly,
//! outbound segmentation, and the facade tying them to a host's network
//! layer (`spec.md` §1).

mod error;
mod facade;
mod ports;
mod reassembly;
mod seq_auth;
mod segmentation;
mod watchdog;

pub use error::LtlError;
pub use facade::LowerTransportLayer;
pub use ports::{Callbacks, IvIndexSource, NetworkTx, SeqNumSource};
pub use reassembly::{
    AccessMessage, ControlMessage, SegmentAckRequest, MAX_ACCESS_PAYLOAD, MAX_CONTROL_PAYLOAD,
};
pub use segmentation::{OutboundEvent, MAX_SEGMENTS};
pub use watchdog::Deadline;
