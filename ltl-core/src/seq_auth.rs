//! Per-source monotonic replay-protection tracker (`spec.md` §4.2).

use heapless::FnvIndexMap;
use ltl_common::address::UnicastAddress;
use ltl_common::SeqAuth;

#[cfg(feature = "log")]
use log::warn;

/// Fixed capacity of the replay-protection table. One entry per peer the
/// node has ever heard a segmented or unsegmented transaction from.
pub const CAPACITY: usize = 32;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeqAuthDecision {
    Accept,
    DuplicateSameSeqAuth,
    Replay,
}

/// Maps `src` to the highest `seq_auth` accepted from it so far.
pub struct SeqAuthStore {
    last: FnvIndexMap<UnicastAddress, u64, CAPACITY>,
}

impl Default for SeqAuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeqAuthStore {
    pub fn new() -> Self {
        Self {
            last: FnvIndexMap::new(),
        }
    }

    /// `Accept` iff `candidate > last[src]` (or absent); `DuplicateSameSeqAuth`
    /// iff equal; `Replay` iff strictly less. Consulted before inserting a
    /// segment into a reassembly slot.
    pub fn check(&self, src: UnicastAddress, candidate: SeqAuth) -> SeqAuthDecision {
        match self.last.get(&src) {
            None => SeqAuthDecision::Accept,
            Some(&last) if candidate.value() > last => SeqAuthDecision::Accept,
            Some(&last) if candidate.value() == last => SeqAuthDecision::DuplicateSameSeqAuth,
            Some(_) => SeqAuthDecision::Replay,
        }
    }

    /// Sets `last[src] = max(last[src], value)`. Evicts the oldest entry
    /// (first in insertion order) when the table is full and `src` is not
    /// already tracked.
    pub fn commit(&mut self, src: UnicastAddress, value: SeqAuth) {
        if let Some(slot) = self.last.get_mut(&src) {
            if value.value() > *slot {
                *slot = value.value();
            }
            return;
        }
        if self.last.insert(src, value.value()).is_err() {
            if let Some((&oldest, _)) = self.last.iter().next() {
                #[cfg(feature = "log")]
                warn!("seqAuth store full, evicting oldest tracked source");
                let _ = self.last.remove(&oldest);
            }
            let _ = self.last.insert(src, value.value());
        }
    }

    pub fn last_seq_auth(&self, src: UnicastAddress) -> Option<u64> {
        self.last.get(&src).copied()
    }
}
