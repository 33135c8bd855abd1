//! Outbound framing: splitting an upper-transport payload into segments,
//! and tracking outstanding transfers for the retransmission query
//! (`spec.md` §4.4).

use heapless::Vec;

use ltl_common::address::Address;
use ltl_common::mic::SzMic;
use ltl_common::SeqZero;
use ltl_pdu::block_ack::{BlockAck, SegmentAck};
use ltl_pdu::lower::{SegmentedAccess, SegmentedControl};
use ltl_pdu::ControlOpcode;

use crate::error::LtlError;
use crate::reassembly::{MAX_ACCESS_PAYLOAD, MAX_CONTROL_PAYLOAD};

const ACCESS_SEGMENT_PAYLOAD: usize = 12;
const CONTROL_SEGMENT_PAYLOAD: usize = 8;

/// `384 / 12 == 256 / 8 == 32`, matching I1 (`segN + 1 <= 32`) exactly at
/// the largest legal payload.
pub const MAX_SEGMENTS: usize = 32;

/// Concurrently tracked outbound transfers (one per destination the host
/// is mid-transfer with).
pub const MAX_OUTBOUND: usize = 4;

fn segment_count(len: usize, unit: usize) -> usize {
    (len + unit - 1) / unit
}

/// Splits an access payload already known to exceed the unsegmented limit
/// into `SegmentedAccess` PDUs sharing `seq_zero`.
pub fn segment_access(
    payload: &[u8],
    akf: bool,
    aid: u8,
    szmic: SzMic,
    seq_zero: SeqZero,
) -> Result<Vec<SegmentedAccess, MAX_SEGMENTS>, LtlError> {
    if payload.len() > MAX_ACCESS_PAYLOAD {
        return Err(LtlError::PayloadTooLarge);
    }
    let count = segment_count(payload.len(), ACCESS_SEGMENT_PAYLOAD);
    let seg_n = (count - 1) as u8;
    let mut out = Vec::new();
    for seg_o in 0..count as u8 {
        let start = seg_o as usize * ACCESS_SEGMENT_PAYLOAD;
        let end = (start + ACCESS_SEGMENT_PAYLOAD).min(payload.len());
        out.push(SegmentedAccess {
            akf,
            aid,
            szmic,
            seq_zero,
            seg_o,
            seg_n,
            segment: heapless::Vec::from_slice(&payload[start..end])
                .map_err(|_| LtlError::InsufficientSpace)?,
        })
        .map_err(|_| LtlError::InsufficientSpace)?;
    }
    Ok(out)
}

/// Splits a control payload already known to exceed the unsegmented limit
/// into `SegmentedControl` PDUs sharing `seq_zero`.
pub fn segment_control(
    payload: &[u8],
    opcode: ControlOpcode,
    seq_zero: SeqZero,
) -> Result<Vec<SegmentedControl, MAX_SEGMENTS>, LtlError> {
    if payload.len() > MAX_CONTROL_PAYLOAD {
        return Err(LtlError::PayloadTooLarge);
    }
    let count = segment_count(payload.len(), CONTROL_SEGMENT_PAYLOAD);
    let seg_n = (count - 1) as u8;
    let mut out = Vec::new();
    for seg_o in 0..count as u8 {
        let start = seg_o as usize * CONTROL_SEGMENT_PAYLOAD;
        let end = (start + CONTROL_SEGMENT_PAYLOAD).min(payload.len());
        out.push(SegmentedControl {
            opcode,
            seq_zero,
            seg_o,
            seg_n,
            segment: heapless::Vec::from_slice(&payload[start..end])
                .map_err(|_| LtlError::InsufficientSpace)?,
        })
        .map_err(|_| LtlError::InsufficientSpace)?;
    }
    Ok(out)
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum OutboundEvent {
    Completed,
    Cancelled,
}

struct OutboundTransfer {
    dst: Address,
    seg_n: u8,
    peer_ack: BlockAck,
}

/// Tracks in-flight outbound transfers so the host's retransmission
/// manager can ask which segments a peer is still missing. The core never
/// retransmits on its own (`spec.md` §4.4).
#[derive(Default)]
pub struct OutboundSegmentation {
    transfers: Vec<OutboundTransfer, MAX_OUTBOUND>,
}

impl OutboundSegmentation {
    pub fn new() -> Self {
        Self { transfers: Vec::new() }
    }

    fn position(&self, dst: Address) -> Option<usize> {
        self.transfers.iter().position(|t| t.dst == dst)
    }

    /// Begins tracking a new outbound segmented transfer, replacing any
    /// prior transfer to the same destination.
    pub fn begin_transfer(&mut self, dst: Address, seg_n: u8) -> Result<(), LtlError> {
        if let Some(i) = self.position(dst) {
            self.transfers.remove(i);
        }
        self.transfers
            .push(OutboundTransfer {
                dst,
                seg_n,
                peer_ack: BlockAck::new(),
            })
            .map_err(|_| LtlError::InsufficientSpace)
    }

    /// Applies an incoming Segment Ack to the matching transfer. A
    /// `BlockAck` of `0` is peer-cancel (`spec.md` §4.4); an ack covering
    /// every segment completes the transfer. Returns `None` if no transfer
    /// to that peer is tracked, or the ack did not conclude it.
    pub fn apply_segment_ack(&mut self, dst: Address, ack: &SegmentAck) -> Option<OutboundEvent> {
        let i = self.position(dst)?;
        if ack.block_ack.is_cancel() {
            self.transfers.remove(i);
            return Some(OutboundEvent::Cancelled);
        }
        self.transfers[i].peer_ack = ack.block_ack;
        if ack.block_ack.is_complete(self.transfers[i].seg_n) {
            self.transfers.remove(i);
            return Some(OutboundEvent::Completed);
        }
        None
    }

    /// Missing `segO` values the host's retransmission manager should hand
    /// back to the network layer, in ascending order.
    pub fn segments_to_resend(&self, dst: Address) -> Vec<u8, MAX_SEGMENTS> {
        let mut out = Vec::new();
        if let Some(i) = self.position(dst) {
            let transfer = &self.transfers[i];
            for seg_o in 0..=transfer.seg_n {
                if !transfer.peer_ack.is_acked(seg_o).unwrap_or(false) {
                    let _ = out.push(seg_o);
                }
            }
        }
        out
    }

    pub fn cancel_outbound(&mut self, dst: Address) {
        if let Some(i) = self.position(dst) {
            self.transfers.remove(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltl_common::address::UnicastAddress;

    fn dst() -> Address {
        Address::from(UnicastAddress::new(0x0200).unwrap())
    }

    /// Scenario 1 from `spec.md` §8.
    #[test]
    fn scenario_1_thirteen_byte_access_payload_splits_into_two_segments() {
        let payload = [
            0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
        ];
        let segments =
            segment_access(&payload, true, 0x05, SzMic::Bit32, SeqZero::new(0x0001)).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].seg_o, 0);
        assert_eq!(segments[0].seg_n, 1);
        assert_eq!(segments[0].segment.len(), 12);
        assert_eq!(segments[1].seg_o, 1);
        assert_eq!(segments[1].segment.as_slice(), &[0xDD]);
    }

    #[test]
    fn rejects_oversized_access_payload() {
        let payload = [0u8; 385];
        assert_eq!(
            segment_access(&payload, false, 0, SzMic::Bit32, SeqZero::new(0)),
            Err(LtlError::PayloadTooLarge)
        );
    }

    /// Scenario 6 from `spec.md` §8.
    #[test]
    fn scenario_6_outbound_retransmit_query() {
        let mut engine = OutboundSegmentation::new();
        let payload = [0u8; 40];
        let segments =
            segment_access(&payload, true, 0x05, SzMic::Bit32, SeqZero::new(0x0010)).unwrap();
        assert_eq!(segments.len(), 4);
        engine.begin_transfer(dst(), segments.last().unwrap().seg_n).unwrap();

        let ack = SegmentAck {
            obo: false,
            seq_zero: SeqZero::new(0x0010),
            block_ack: BlockAck::new(),
        };
        let mut ack = ack;
        ack.block_ack.ack(0).unwrap();
        ack.block_ack.ack(2).unwrap();

        assert!(engine.apply_segment_ack(dst(), &ack).is_none());
        let mut resend = engine.segments_to_resend(dst());
        resend.sort_unstable();
        assert_eq!(resend.as_slice(), &[1, 3]);
    }

    #[test]
    fn zero_block_ack_is_peer_cancel() {
        let mut engine = OutboundSegmentation::new();
        engine.begin_transfer(dst(), 3).unwrap();
        let cancel = SegmentAck {
            obo: false,
            seq_zero: SeqZero::new(0x0010),
            block_ack: BlockAck::new(),
        };
        assert_eq!(
            engine.apply_segment_ack(dst(), &cancel),
            Some(OutboundEvent::Cancelled)
        );
        assert!(engine.segments_to_resend(dst()).is_empty());
    }
}
