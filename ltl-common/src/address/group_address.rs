//! Group (multicast) mesh addresses.

use crate::address::{Address, InvalidAddress};

/// A group address — never the recipient of a Segment Acknowledgment
/// (`spec.md` §4.3 group-vs-unicast policy).
#[derive(Copy, Clone, Hash, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GroupAddress {
    Rfu(u16),
    Normal(u16),
    AllProxies,
    AllFriends,
    AllRelays,
    AllNodes,
}

impl GroupAddress {
    pub fn as_bytes(&self) -> [u8; 2] {
        match self {
            GroupAddress::Rfu(bytes) | GroupAddress::Normal(bytes) => bytes.to_be_bytes(),
            GroupAddress::AllProxies => [0xFF, 0xFC],
            GroupAddress::AllFriends => [0xFF, 0xFD],
            GroupAddress::AllRelays => [0xFF, 0xFE],
            GroupAddress::AllNodes => [0xFF, 0xFF],
        }
    }

    pub fn is_group_address(data: &[u8; 2]) -> bool {
        (data[0] & 0b1100_0000) == 0b1100_0000
    }

    pub fn parse(data: [u8; 2]) -> Result<Self, InvalidAddress> {
        if Self::is_group_address(&data) {
            // Safety: already checked.
            unsafe { Ok(Self::new_unchecked(data)) }
        } else {
            Err(InvalidAddress)
        }
    }

    /// # Safety
    /// The caller must have already verified the bit-pattern with
    /// `is_group_address`.
    pub unsafe fn new_unchecked(data: [u8; 2]) -> Self {
        match data {
            [0xFF, 0xFC] => Self::AllProxies,
            [0xFF, 0xFD] => Self::AllFriends,
            [0xFF, 0xFE] => Self::AllRelays,
            [0xFF, 0xFF] => Self::AllNodes,
            [0xFF, _] => Self::Rfu(u16::from_be_bytes(data)),
            _ => Self::Normal(u16::from_be_bytes(data)),
        }
    }
}

impl From<GroupAddress> for Address {
    fn from(addr: GroupAddress) -> Self {
        Self::Group(addr)
    }
}
