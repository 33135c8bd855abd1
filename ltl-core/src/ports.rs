//! Collaborator ports and the callback capability struct the host supplies
//! at construction — the "duck-typed callback object becomes a capability
//! struct" shape, adapted to plain synchronous methods since the engine
//! never awaits.

use ltl_common::address::{Address, UnicastAddress};
use ltl_common::{IvIndex, Seq};
use ltl_pdu::NetworkPdu;

use crate::reassembly::{AccessMessage, ControlMessage};

/// Hands a framed lower-transport PDU to the network layer. Infallible from
/// the engine's point of view — transmission failures are a network-layer
/// concern.
pub trait NetworkTx {
    fn send(&mut self, pdu: NetworkPdu);
}

/// Monotonic per-source sequence number source for outbound traffic.
pub trait SeqNumSource {
    fn next(&mut self, src: UnicastAddress) -> Seq;
}

/// Current IV index, consulted when stamping outbound PDUs and when
/// reconstructing a `SeqAuth` for inbound ones.
pub trait IvIndexSource {
    fn current(&self) -> IvIndex;
}

/// The callbacks emitted by the engine. A plain struct of `FnMut` closures
/// rather than a trait object per callback, since the engine only ever
/// holds one of these at a time for the lifetime of a single `on_receive`
/// / `tick` call.
pub struct Callbacks<'a> {
    pub on_access_delivered: &'a mut dyn FnMut(AccessMessage),
    pub on_control_delivered: &'a mut dyn FnMut(ControlMessage),
    pub on_incomplete_timer_expired: &'a mut dyn FnMut(UnicastAddress),
    pub on_segment_ack_required: &'a mut dyn FnMut(NetworkPdu),
    pub on_outbound_cancelled: &'a mut dyn FnMut(Address),
}
