use crate::address::{Address, InvalidAddress};
use hash32_derive::Hash32;

/// A single-element, single-node destination or source address.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Debug, Hash, Hash32, Default)]
pub struct UnicastAddress(u16);

impl UnicastAddress {
    pub fn new(addr: u16) -> Result<Self, InvalidAddress> {
        if Self::is_unicast_address(&addr.to_be_bytes()) {
            Ok(Self(addr))
        } else {
            Err(InvalidAddress)
        }
    }

    /// # Safety
    /// The caller must have already verified the bit-pattern with
    /// `is_unicast_address`.
    pub unsafe fn new_unchecked(addr: u16) -> Self {
        Self(addr)
    }

    pub fn as_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn is_unicast_address(data: &[u8; 2]) -> bool {
        data[0] & 0b1000_0000 == 0
    }

    pub fn parse(data: [u8; 2]) -> Result<Self, InvalidAddress> {
        if Self::is_unicast_address(&data) {
            Ok(UnicastAddress(u16::from_be_bytes(data)))
        } else {
            Err(InvalidAddress)
        }
    }
}

impl From<UnicastAddress> for Address {
    fn from(addr: UnicastAddress) -> Self {
        Self::Unicast(addr)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for UnicastAddress {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=u16:04x}", self.0);
    }
}
