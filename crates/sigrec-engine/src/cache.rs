use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use sigrec_types::MemberId;

/// Resolve-or-compute memo keyed by member.
///
/// The map lock is only held to fetch the member's slot; the computation runs outside it, so a
/// computation may itself resolve other members through the same cache. Concurrent callers for
/// one member block on its slot and observe a single computation.
#[derive(Debug)]
pub struct SignatureCache<V> {
    slots: Mutex<HashMap<MemberId, Arc<OnceLock<V>>>>,
}

impl<V> Default for SignatureCache<V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> SignatureCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&self, member: MemberId, compute: impl FnOnce() -> V) -> V {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(member).or_insert_with(|| Arc::new(OnceLock::new())))
        };
        slot.get_or_init(|| {
            tracing::trace!(target: "sigrec.engine", ?member, "computing member signature");
            compute()
        })
        .clone()
    }

    pub fn get(&self, member: MemberId) -> Option<V> {
        let slot = self.slots.lock().get(&member).cloned()?;
        slot.get().cloned()
    }

    /// Number of members with a finished computation.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
