//! The inbound collaborator interface: the de-obfuscated, authenticated
//! record the network layer hands up to the Lower Transport Layer
//! (`spec.md` §1 "out of scope" / §6 ports). Network-layer decryption and
//! authentication already happened; only the fields the Lower Transport
//! Layer needs to frame/reassemble survive here.

use heapless::Vec;
use ltl_common::address::{Address, UnicastAddress};
use ltl_common::{Ctl, IvIndex, Seq, Ttl};

/// Maximum lower-transport PDU: 4-byte segmented header + 12-byte access
/// segment payload (`spec.md` §3 LowerSegment).
pub const MAX_LOWER_PDU: usize = 16;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct NetworkPdu {
    pub src: UnicastAddress,
    pub dst: Address,
    pub ttl: Ttl,
    pub seq: Seq,
    pub iv_index: IvIndex,
    pub ctl: Ctl,
    pub transport_pdu: Vec<u8, MAX_LOWER_PDU>,
}

impl NetworkPdu {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        src: UnicastAddress,
        dst: Address,
        ttl: Ttl,
        seq: Seq,
        iv_index: IvIndex,
        ctl: Ctl,
        transport_pdu: &[u8],
    ) -> Result<Self, ()> {
        Ok(Self {
            src,
            dst,
            ttl,
            seq,
            iv_index,
            ctl,
            transport_pdu: Vec::from_slice(transport_pdu)?,
        })
    }
}
