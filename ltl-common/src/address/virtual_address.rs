use crate::address::{Address, InvalidAddress};

/// A virtual address — like a group address, never the recipient of a
/// Segment Acknowledgment. Label-UUID-to-address derivation is performed
/// by the (out-of-scope) application/upper-transport layer; the Lower
/// Transport Layer only needs to recognize the bit-pattern.
#[derive(Copy, Clone, Hash, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VirtualAddress(u16);

impl VirtualAddress {
    pub fn new(addr: u16) -> Result<Self, InvalidAddress> {
        if Self::is_virtual_address(&addr.to_be_bytes()) {
            Ok(Self(addr))
        } else {
            Err(InvalidAddress)
        }
    }

    /// # Safety
    /// The caller must have already verified the bit-pattern with
    /// `is_virtual_address`.
    pub unsafe fn new_unchecked(addr: u16) -> Self {
        Self(addr)
    }

    pub fn as_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn is_virtual_address(data: &[u8; 2]) -> bool {
        data[0] & 0b1100_0000 == 0b1000_0000
    }

    pub fn parse(data: [u8; 2]) -> Result<Self, InvalidAddress> {
        if Self::is_virtual_address(&data) {
            Ok(VirtualAddress(u16::from_be_bytes(data)))
        } else {
            Err(InvalidAddress)
        }
    }
}

impl From<VirtualAddress> for Address {
    fn from(addr: VirtualAddress) -> Self {
        Self::Virtual(addr)
    }
}
