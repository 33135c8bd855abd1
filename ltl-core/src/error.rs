//! Outbound-facing error type. Inbound faults (`Replay`, `DuplicateSegment`,
//! `IncompleteTimeout`) never reach here — they are silent drops or host
//! notifications, not `Result::Err`s.

use core::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LtlError {
    MalformedHeader,
    PayloadTooLarge,
    InvalidOpcode,
    InsufficientSpace,
}

impl fmt::Display for LtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader => f.write_str("malformed lower-transport header"),
            Self::PayloadTooLarge => f.write_str("upper-transport payload exceeds the class limit"),
            Self::InvalidOpcode => f.write_str("control opcode reserved or out of range"),
            Self::InsufficientSpace => f.write_str("fixed-capacity buffer or table is full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LtlError {}

impl From<ltl_pdu::MalformedHeader> for LtlError {
    fn from(_: ltl_pdu::MalformedHeader) -> Self {
        Self::MalformedHeader
    }
}

impl From<ltl_common::InsufficientBuffer> for LtlError {
    fn from(_: ltl_common::InsufficientBuffer) -> Self {
        Self::InsufficientSpace
    }
}
