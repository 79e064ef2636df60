//! LIFO stack of active zones.

use super::types::ZoneId;

/// Ordered zone handles; the last entry is the most recently activated zone.
///
/// A zone appears at most once.
#[derive(Debug, Clone, Default)]
pub struct ZoneStack {
    zones: Vec<ZoneId>,
}

impl ZoneStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a zone. Returns `false` (and leaves the stack untouched) when the
    /// zone is already present.
    pub fn push(&mut self, zone: ZoneId) -> bool {
        if self.contains(zone) {
            return false;
        }
        self.zones.push(zone);
        true
    }

    pub fn pop(&mut self) -> Option<ZoneId> {
        self.zones.pop()
    }

    /// Remove a zone from anywhere in the stack.
    pub fn remove(&mut self, zone: ZoneId) -> bool {
        match self.zones.iter().position(|entry| *entry == zone) {
            Some(index) => {
                self.zones.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn top(&self) -> Option<ZoneId> {
        self.zones.last().copied()
    }

    /// The zone directly beneath the top.
    pub fn below_top(&self) -> Option<ZoneId> {
        self.zones.len().checked_sub(2).map(|index| self.zones[index])
    }

    pub fn contains(&self, zone: ZoneId) -> bool {
        self.zones.contains(&zone)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rejects_duplicates() {
        let mut stack = ZoneStack::new();
        assert!(stack.push(ZoneId::new(1)));
        assert!(stack.push(ZoneId::new(2)));
        assert!(!stack.push(ZoneId::new(1)));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top(), Some(ZoneId::new(2)));
        assert_eq!(stack.below_top(), Some(ZoneId::new(1)));
    }

    #[test]
    fn remove_keeps_order_of_remaining_zones() {
        let mut stack = ZoneStack::new();
        for index in 0..4 {
            stack.push(ZoneId::new(index));
        }
        assert!(stack.remove(ZoneId::new(1)));
        assert!(!stack.remove(ZoneId::new(1)));
        let order: Vec<usize> = stack.iter().map(ZoneId::index).collect();
        assert_eq!(order, vec![0, 2, 3]);
    }

    #[test]
    fn lifo_over_random_sequences() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(11);
        let mut stack = ZoneStack::new();
        let mut model: Vec<ZoneId> = Vec::new();
        for _ in 0..500 {
            if rng.gen_bool(0.6) {
                let zone = ZoneId::new(rng.gen_range(0..6));
                let pushed = stack.push(zone);
                assert_eq!(pushed, !model.contains(&zone));
                if pushed {
                    model.push(zone);
                }
            } else {
                assert_eq!(stack.pop(), model.pop());
            }
            assert_eq!(stack.top(), model.last().copied());
            let entries: Vec<ZoneId> = stack.iter().collect();
            let mut deduped = entries.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), entries.len());
        }
    }
}
