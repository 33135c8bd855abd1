//! Lower-transport PDU value types: the framed unit handed to/from the
//! network layer (`spec.md` §3 LowerSegment). Combines the header codec
//! (`header`) with the payload bytes into a single parsed/emittable PDU.

use heapless::Vec;
use ltl_common::mic::SzMic;
use ltl_common::{Ctl, SeqZero};

use crate::header::{
    decode_segmented_access_header, decode_segmented_control_header,
    decode_unsegmented_access_header, decode_unsegmented_control_header,
    encode_segmented_access_header, encode_segmented_control_header,
    encode_unsegmented_access_header, encode_unsegmented_control_header, MalformedHeader,
    SegmentedAccessHeader, SegmentedControlHeader,
};
use crate::network::NetworkPdu;
use crate::ControlOpcode;

/// Maximum unsegmented access payload (`spec.md` §4.4).
pub const UNSEGMENTED_ACCESS_MAX: usize = 11;
/// Payload carried by every non-final access segment (`spec.md` §3 I2).
pub const SEGMENTED_ACCESS_PAYLOAD: usize = 12;
/// Maximum unsegmented control payload (`spec.md` §4.4).
pub const UNSEGMENTED_CONTROL_MAX: usize = 8;
/// Payload carried by every non-final control segment.
pub const SEGMENTED_CONTROL_PAYLOAD: usize = 8;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UnsegmentedAccess {
    pub akf: bool,
    pub aid: u8,
    pub payload: Vec<u8, UNSEGMENTED_ACCESS_MAX>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SegmentedAccess {
    pub akf: bool,
    pub aid: u8,
    pub szmic: SzMic,
    pub seq_zero: SeqZero,
    pub seg_o: u8,
    pub seg_n: u8,
    pub segment: Vec<u8, SEGMENTED_ACCESS_PAYLOAD>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UnsegmentedControl {
    pub opcode: ControlOpcode,
    pub payload: Vec<u8, UNSEGMENTED_CONTROL_MAX>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SegmentedControl {
    pub opcode: ControlOpcode,
    pub seq_zero: SeqZero,
    pub seg_o: u8,
    pub seg_n: u8,
    pub segment: Vec<u8, SEGMENTED_CONTROL_PAYLOAD>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LowerPdu {
    UnsegmentedAccess(UnsegmentedAccess),
    SegmentedAccess(SegmentedAccess),
    UnsegmentedControl(UnsegmentedControl),
    SegmentedControl(SegmentedControl),
}

impl LowerPdu {
    pub fn is_segmented(&self) -> bool {
        matches!(self, Self::SegmentedAccess(_) | Self::SegmentedControl(_))
    }

    pub fn parse(network_pdu: &NetworkPdu) -> Result<Self, MalformedHeader> {
        let data = network_pdu.transport_pdu.as_slice();
        if data.is_empty() {
            return Err(MalformedHeader);
        }
        let seg = data[0] & 0b1000_0000 != 0;
        match (network_pdu.ctl, seg) {
            (Ctl::Access, false) => {
                let (akf, aid) = decode_unsegmented_access_header(data[0])?;
                Ok(Self::UnsegmentedAccess(UnsegmentedAccess {
                    akf,
                    aid,
                    payload: Vec::from_slice(&data[1..]).map_err(|_| MalformedHeader)?,
                }))
            }
            (Ctl::Access, true) => {
                let header = decode_segmented_access_header(data)?;
                Ok(Self::SegmentedAccess(SegmentedAccess {
                    akf: header.akf,
                    aid: header.aid,
                    szmic: header.szmic,
                    seq_zero: header.seq_zero,
                    seg_o: header.seg_o,
                    seg_n: header.seg_n,
                    segment: Vec::from_slice(&data[4..]).map_err(|_| MalformedHeader)?,
                }))
            }
            (Ctl::Control, false) => {
                let opcode = decode_unsegmented_control_header(data[0])?;
                Ok(Self::UnsegmentedControl(UnsegmentedControl {
                    opcode,
                    payload: Vec::from_slice(&data[1..]).map_err(|_| MalformedHeader)?,
                }))
            }
            (Ctl::Control, true) => {
                let header = decode_segmented_control_header(data)?;
                Ok(Self::SegmentedControl(SegmentedControl {
                    opcode: header.opcode,
                    seq_zero: header.seq_zero,
                    seg_o: header.seg_o,
                    seg_n: header.seg_n,
                    segment: Vec::from_slice(&data[4..]).map_err(|_| MalformedHeader)?,
                }))
            }
        }
    }

    pub fn emit<const N: usize>(&self, out: &mut Vec<u8, N>) -> Result<(), ()> {
        match self {
            Self::UnsegmentedAccess(pdu) => {
                out.push(encode_unsegmented_access_header(pdu.akf, pdu.aid))
                    .map_err(|_| ())?;
                out.extend_from_slice(&pdu.payload)?;
            }
            Self::SegmentedAccess(pdu) => {
                let header = encode_segmented_access_header(&SegmentedAccessHeader {
                    akf: pdu.akf,
                    aid: pdu.aid,
                    szmic: pdu.szmic,
                    seq_zero: pdu.seq_zero,
                    seg_o: pdu.seg_o,
                    seg_n: pdu.seg_n,
                });
                out.extend_from_slice(&header)?;
                out.extend_from_slice(&pdu.segment)?;
            }
            Self::UnsegmentedControl(pdu) => {
                out.push(encode_unsegmented_control_header(pdu.opcode))
                    .map_err(|_| ())?;
                out.extend_from_slice(&pdu.payload)?;
            }
            Self::SegmentedControl(pdu) => {
                let header = encode_segmented_control_header(&SegmentedControlHeader {
                    opcode: pdu.opcode,
                    seq_zero: pdu.seq_zero,
                    seg_o: pdu.seg_o,
                    seg_n: pdu.seg_n,
                });
                out.extend_from_slice(&header)?;
                out.extend_from_slice(&pdu.segment)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltl_common::address::{Address, UnicastAddress};
    use ltl_common::{IvIndex, Seq};

    fn network_pdu(ctl: Ctl, transport_pdu: &[u8]) -> NetworkPdu {
        NetworkPdu::new(
            UnicastAddress::new(0x0100).unwrap(),
            Address::from(UnicastAddress::new(0x0200).unwrap()),
            ltl_common::Ttl::new(5),
            Seq::new(1001),
            IvIndex::new(1),
            ctl,
            transport_pdu,
        )
        .unwrap()
    }

    #[test]
    fn round_trip_segmented_access() {
        let pdu = LowerPdu::SegmentedAccess(SegmentedAccess {
            akf: true,
            aid: 0x05,
            szmic: SzMic::Bit32,
            seq_zero: SeqZero::new(1),
            seg_o: 1,
            seg_n: 1,
            segment: Vec::from_slice(b"x").unwrap(),
        });
        let mut buf: Vec<u8, 16> = Vec::new();
        pdu.emit(&mut buf).unwrap();
        let net = network_pdu(Ctl::Access, &buf);
        assert_eq!(LowerPdu::parse(&net).unwrap(), pdu);
    }

    #[test]
    fn rejects_empty_pdu() {
        let net = network_pdu(Ctl::Access, &[]);
        assert_eq!(LowerPdu::parse(&net), Err(MalformedHeader));
    }
}
