//! Write-once holder for the VLAN learned during the broadcast.

use crate::types::VlanId;
use std::sync::OnceLock;

/// The first VLAN any device reported for the target.
///
/// Only the first `offer` of a present VLAN is kept; absent observations and
/// later VLANs never replace it. Safe to share between concurrent queries.
#[derive(Debug, Default)]
pub struct RetainedVlan(OnceLock<VlanId>);

impl RetainedVlan {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an observed VLAN. Returns `true` if this call set the value.
    pub fn offer(&self, vlan: Option<VlanId>) -> bool {
        match vlan {
            Some(vlan) => self.0.set(vlan).is_ok(),
            None => false,
        }
    }

    /// The retained VLAN, if any device reported one.
    pub fn get(&self) -> Option<VlanId> {
        self.0.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_present_vlan_wins() {
        let cell = RetainedVlan::new();
        assert_eq!(cell.get(), None);

        assert!(!cell.offer(None));
        assert!(cell.offer(VlanId::new(10)));
        assert!(!cell.offer(VlanId::new(20)));
        assert!(!cell.offer(None));

        assert_eq!(cell.get(), VlanId::new(10));
    }

    #[test]
    fn test_single_winner_across_threads() {
        let cell = Arc::new(RetainedVlan::new());

        let handles: Vec<_> = (1..=16u16)
            .map(|id| {
                let cell = Arc::clone(&cell);
                std::thread::spawn(move || cell.offer(VlanId::new(id)))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert!(cell.get().is_some());
    }
}
