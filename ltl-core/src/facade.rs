//! The single entry point a host wires its network layer into: framing
//! outbound upper-transport payloads, reassembling inbound ones, and
//! driving the two engines' timers (`spec.md` §1 overview, §6 ports).

use embassy_time::Instant;
use heapless::Vec;

use ltl_common::address::{Address, UnicastAddress};
use ltl_common::mic::SzMic;
use ltl_common::{Ctl, SeqZero, Ttl};
use ltl_pdu::block_ack::{decode_segment_ack, encode_segment_ack, SegmentAck};
use ltl_pdu::lower::{
    LowerPdu, UnsegmentedAccess, UnsegmentedControl, UNSEGMENTED_ACCESS_MAX,
    UNSEGMENTED_CONTROL_MAX,
};
use ltl_pdu::network::{NetworkPdu, MAX_LOWER_PDU};
use ltl_pdu::ControlOpcode;

use crate::error::LtlError;
use crate::ports::{Callbacks, IvIndexSource, NetworkTx, SeqNumSource};
use crate::reassembly::{
    AccessMessage, ControlMessage, ReassemblyEngine, SegmentAckRequest, MAX_ACCESS_PAYLOAD,
    MAX_CONTROL_PAYLOAD,
};
use crate::segmentation::{
    segment_access, segment_control, OutboundEvent, OutboundSegmentation, MAX_SEGMENTS,
};

/// Ties the Segmentation Engine and the reassembly/replay state together
/// behind the operations a host actually calls: send, receive, tick.
pub struct LowerTransportLayer {
    own_address: UnicastAddress,
    default_ttl: Ttl,
    reassembly: ReassemblyEngine,
    outbound: OutboundSegmentation,
}

impl LowerTransportLayer {
    pub fn new(own_address: UnicastAddress, default_ttl: Ttl) -> Self {
        Self {
            own_address,
            default_ttl,
            reassembly: ReassemblyEngine::new(),
            outbound: OutboundSegmentation::new(),
        }
    }

    /// Frames and transmits an access payload, splitting it into segments
    /// if it exceeds the 11-byte unsegmented limit. Fails `PayloadTooLarge`
    /// above 384 bytes (`spec.md` §3).
    #[allow(clippy::too_many_arguments)]
    pub fn send_access<S: SeqNumSource, I: IvIndexSource, T: NetworkTx>(
        &mut self,
        payload: &[u8],
        dst: Address,
        akf: bool,
        aid: u8,
        szmic: SzMic,
        seq_src: &mut S,
        iv_src: &I,
        tx: &mut T,
    ) -> Result<(), LtlError> {
        if payload.len() > MAX_ACCESS_PAYLOAD {
            return Err(LtlError::PayloadTooLarge);
        }
        let first_seq = seq_src.next(self.own_address);
        if payload.len() <= UNSEGMENTED_ACCESS_MAX {
            let lower = LowerPdu::UnsegmentedAccess(UnsegmentedAccess {
                akf,
                aid,
                payload: Vec::from_slice(payload).map_err(|_| LtlError::InsufficientSpace)?,
            });
            return self.transmit(&lower, dst, first_seq, iv_src, tx);
        }

        let seq_zero = SeqZero::from(first_seq);
        let segments = segment_access(payload, akf, aid, szmic, seq_zero)?;
        self.outbound
            .begin_transfer(dst, segments.last().expect("non-empty split").seg_n)?;
        for segment in &segments {
            let seq = first_seq + segment.seg_o as u32;
            let lower = LowerPdu::SegmentedAccess(segment.clone());
            self.transmit(&lower, dst, seq, iv_src, tx)?;
        }
        Ok(())
    }

    /// Frames and transmits a control payload. Rejects opcode `0x00`
    /// (Segment Acknowledgment is engine-internal) and payloads above 256
    /// bytes.
    #[allow(clippy::too_many_arguments)]
    pub fn send_control<S: SeqNumSource, I: IvIndexSource, T: NetworkTx>(
        &mut self,
        opcode: ControlOpcode,
        payload: &[u8],
        dst: Address,
        seq_src: &mut S,
        iv_src: &I,
        tx: &mut T,
    ) -> Result<(), LtlError> {
        if opcode.is_segment_ack() {
            return Err(LtlError::InvalidOpcode);
        }
        if payload.len() > MAX_CONTROL_PAYLOAD {
            return Err(LtlError::PayloadTooLarge);
        }
        let first_seq = seq_src.next(self.own_address);
        if payload.len() <= UNSEGMENTED_CONTROL_MAX {
            let lower = LowerPdu::UnsegmentedControl(UnsegmentedControl {
                opcode,
                payload: Vec::from_slice(payload).map_err(|_| LtlError::InsufficientSpace)?,
            });
            return self.transmit(&lower, dst, first_seq, iv_src, tx);
        }

        let seq_zero = SeqZero::from(first_seq);
        let segments = segment_control(payload, opcode, seq_zero)?;
        self.outbound
            .begin_transfer(dst, segments.last().expect("non-empty split").seg_n)?;
        for segment in &segments {
            let seq = first_seq + segment.seg_o as u32;
            let lower = LowerPdu::SegmentedControl(segment.clone());
            self.transmit(&lower, dst, seq, iv_src, tx)?;
        }
        Ok(())
    }

    fn transmit<I: IvIndexSource, T: NetworkTx>(
        &self,
        lower: &LowerPdu,
        dst: Address,
        seq: ltl_common::Seq,
        iv_src: &I,
        tx: &mut T,
    ) -> Result<(), LtlError> {
        let ctl = match lower {
            LowerPdu::UnsegmentedAccess(_) | LowerPdu::SegmentedAccess(_) => Ctl::Access,
            LowerPdu::UnsegmentedControl(_) | LowerPdu::SegmentedControl(_) => Ctl::Control,
        };
        let mut buf: Vec<u8, MAX_LOWER_PDU> = Vec::new();
        lower.emit(&mut buf).map_err(|_| LtlError::InsufficientSpace)?;
        let pdu = NetworkPdu::new(
            self.own_address,
            dst,
            self.default_ttl,
            seq,
            iv_src.current(),
            ctl,
            &buf,
        )
        .map_err(|_| LtlError::InsufficientSpace)?;
        tx.send(pdu);
        Ok(())
    }

    /// Single entry point for inbound traffic. Dispatches to the
    /// reassembly engine or, for an incoming Segment Acknowledgment, to the
    /// outbound transfer tracker. A due ack is sent (and observed via
    /// `on_segment_ack_required`) before the delivery callback fires
    /// (`spec.md` §5 ordering).
    pub fn on_receive<S: SeqNumSource, I: IvIndexSource, T: NetworkTx>(
        &mut self,
        pdu: &NetworkPdu,
        seq_src: &mut S,
        iv_src: &I,
        tx: &mut T,
        callbacks: &mut Callbacks,
        now: Instant,
    ) -> Result<(), LtlError> {
        let lower = LowerPdu::parse(pdu)?;
        match lower {
            LowerPdu::UnsegmentedAccess(pdu_access) => {
                let mut payload = Vec::new();
                payload
                    .extend_from_slice(&pdu_access.payload)
                    .map_err(|_| LtlError::InsufficientSpace)?;
                (callbacks.on_access_delivered)(AccessMessage {
                    src: pdu.src,
                    dst: pdu.dst,
                    akf: pdu_access.akf,
                    aid: pdu_access.aid,
                    szmic: SzMic::Bit32,
                    seq: pdu.seq,
                    payload,
                });
            }
            LowerPdu::UnsegmentedControl(pdu_control) if pdu_control.opcode.is_segment_ack() => {
                let ack = decode_segment_ack(&pdu_control.payload)?;
                if let Some(OutboundEvent::Cancelled) =
                    self.outbound.apply_segment_ack(Address::from(pdu.src), &ack)
                {
                    (callbacks.on_outbound_cancelled)(Address::from(pdu.src));
                }
            }
            LowerPdu::UnsegmentedControl(pdu_control) => {
                let mut payload = Vec::new();
                payload
                    .extend_from_slice(&pdu_control.payload)
                    .map_err(|_| LtlError::InsufficientSpace)?;
                (callbacks.on_control_delivered)(ControlMessage {
                    src: pdu.src,
                    dst: pdu.dst,
                    opcode: pdu_control.opcode,
                    seq: pdu.seq,
                    payload,
                });
            }
            LowerPdu::SegmentedAccess(segment) => {
                let outcome = self.reassembly.process_access_segment(
                    pdu.src, pdu.dst, pdu.ttl, pdu.iv_index, pdu.seq, &segment, now,
                )?;
                if let Some(req) = outcome.ack {
                    self.send_ack(req, seq_src, iv_src, tx, callbacks)?;
                }
                if let Some(message) = outcome.delivered {
                    (callbacks.on_access_delivered)(message);
                }
            }
            LowerPdu::SegmentedControl(segment) => {
                let outcome = self.reassembly.process_control_segment(
                    pdu.src, pdu.dst, pdu.ttl, pdu.iv_index, pdu.seq, &segment, now,
                )?;
                if let Some(req) = outcome.ack {
                    self.send_ack(req, seq_src, iv_src, tx, callbacks)?;
                }
                if let Some(message) = outcome.delivered {
                    (callbacks.on_control_delivered)(message);
                }
            }
        }
        Ok(())
    }

    fn send_ack<S: SeqNumSource, I: IvIndexSource, T: NetworkTx>(
        &self,
        req: SegmentAckRequest,
        seq_src: &mut S,
        iv_src: &I,
        tx: &mut T,
        callbacks: &mut Callbacks,
    ) -> Result<(), LtlError> {
        let ack = SegmentAck {
            obo: false,
            seq_zero: req.seq_zero,
            block_ack: req.block_ack,
        };
        let mut payload: Vec<u8, UNSEGMENTED_CONTROL_MAX> = Vec::new();
        payload
            .extend_from_slice(&encode_segment_ack(&ack))
            .map_err(|_| LtlError::InsufficientSpace)?;
        let lower = LowerPdu::UnsegmentedControl(UnsegmentedControl {
            opcode: ControlOpcode::SEGMENT_ACK,
            payload,
        });
        let seq = seq_src.next(self.own_address);
        let mut buf: Vec<u8, MAX_LOWER_PDU> = Vec::new();
        lower.emit(&mut buf).map_err(|_| LtlError::InsufficientSpace)?;
        let ack_pdu = NetworkPdu::new(
            self.own_address,
            Address::from(req.peer),
            self.default_ttl,
            seq,
            iv_src.current(),
            Ctl::Control,
            &buf,
        )
        .map_err(|_| LtlError::InsufficientSpace)?;
        (callbacks.on_segment_ack_required)(ack_pdu.clone());
        tx.send(ack_pdu);
        Ok(())
    }

    /// Drives both engines' timers. An expired Incomplete Timer is
    /// reported via `on_incomplete_timer_expired`; the engine never
    /// retransmits on its own, so outbound retransmission stays entirely
    /// the host's decision (queried with `segments_to_resend`).
    pub fn tick(&mut self, now: Instant, callbacks: &mut Callbacks) {
        let outcome = self.reassembly.tick(now);
        if let Some(src) = outcome.incomplete_expired {
            (callbacks.on_incomplete_timer_expired)(src);
        }
    }

    /// Missing `segO` values the host should resend for its outbound
    /// transfer to `dst`, per the most recent Segment Ack observed.
    pub fn segments_to_resend(&self, dst: Address) -> Vec<u8, MAX_SEGMENTS> {
        self.outbound.segments_to_resend(dst)
    }

    pub fn cancel_outbound(&mut self, dst: Address) {
        self.outbound.cancel_outbound(dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltl_common::IvIndex;

    struct FakeSeq(u32);
    impl SeqNumSource for FakeSeq {
        fn next(&mut self, _src: UnicastAddress) -> ltl_common::Seq {
            let seq = ltl_common::Seq::new(self.0);
            self.0 += 1;
            seq
        }
    }

    struct FakeIv;
    impl IvIndexSource for FakeIv {
        fn current(&self) -> IvIndex {
            IvIndex::new(1)
        }
    }

    #[derive(Default)]
    struct Sink(Vec<NetworkPdu, 8>);
    impl NetworkTx for Sink {
        fn send(&mut self, pdu: NetworkPdu) {
            let _ = self.0.push(pdu);
        }
    }

    #[test]
    fn unsegmented_access_round_trips_through_on_receive() {
        let mut ltl = LowerTransportLayer::new(UnicastAddress::new(0x0100).unwrap(), Ttl::new(5));
        let mut seq_src = FakeSeq(1000);
        let iv_src = FakeIv;
        let mut tx = Sink::default();

        ltl.send_access(
            b"hello",
            Address::from(UnicastAddress::new(0x0200).unwrap()),
            true,
            0x05,
            SzMic::Bit32,
            &mut seq_src,
            &iv_src,
            &mut tx,
        )
        .unwrap();
        assert_eq!(tx.0.len(), 1);

        let inbound_pdu = tx.0[0].clone();
        let mut delivered = None;
        let mut noop_ctl = |_: ControlMessage| {};
        let mut noop_timer = |_: UnicastAddress| {};
        let mut noop_ack = |_: NetworkPdu| {};
        let mut noop_cancel = |_: Address| {};
        let mut capture = |m: AccessMessage| delivered = Some(m);
        let mut callbacks = Callbacks {
            on_access_delivered: &mut capture,
            on_control_delivered: &mut noop_ctl,
            on_incomplete_timer_expired: &mut noop_timer,
            on_segment_ack_required: &mut noop_ack,
            on_outbound_cancelled: &mut noop_cancel,
        };

        let mut receiver = LowerTransportLayer::new(UnicastAddress::new(0x0200).unwrap(), Ttl::new(5));
        receiver
            .on_receive(
                &inbound_pdu,
                &mut seq_src,
                &iv_src,
                &mut tx,
                &mut callbacks,
                Instant::from_millis(0),
            )
            .unwrap();
        assert_eq!(delivered.unwrap().payload.as_slice(), b"hello");
    }

    #[test]
    fn oversized_control_payload_is_rejected() {
        let mut ltl = LowerTransportLayer::new(UnicastAddress::new(0x0100).unwrap(), Ttl::new(5));
        let mut seq_src = FakeSeq(1);
        let iv_src = FakeIv;
        let mut tx = Sink::default();
        let payload = [0u8; 257];
        let err = ltl
            .send_control(
                ControlOpcode::HEARTBEAT,
                &payload,
                Address::from(UnicastAddress::new(0x0200).unwrap()),
                &mut seq_src,
                &iv_src,
                &mut tx,
            )
            .unwrap_err();
        assert_eq!(err, LtlError::PayloadTooLarge);
    }

    #[test]
    fn segment_ack_opcode_is_rejected_for_outbound_control() {
        let mut ltl = LowerTransportLayer::new(UnicastAddress::new(0x0100).unwrap(), Ttl::new(5));
        let mut seq_src = FakeSeq(1);
        let iv_src = FakeIv;
        let mut tx = Sink::default();
        let err = ltl
            .send_control(
                ControlOpcode::SEGMENT_ACK,
                &[],
                Address::from(UnicastAddress::new(0x0200).unwrap()),
                &mut seq_src,
                &iv_src,
                &mut tx,
            )
            .unwrap_err();
        assert_eq!(err, LtlError::InvalidOpcode);
    }
}
