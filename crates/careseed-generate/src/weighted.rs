use rand::{Rng, RngCore};

/// Discrete distribution written as explicit `value -> weight` pairs.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    total: u32,
}

impl<T: Copy> WeightedTable<T> {
    /// Zero-weight entries are dropped. Panics on an empty table, which
    /// can only come from a constant in this crate.
    pub fn new(entries: &[(T, u32)]) -> Self {
        let entries: Vec<(T, u32)> = entries
            .iter()
            .copied()
            .filter(|(_, weight)| *weight > 0)
            .collect();
        let total = entries.iter().map(|(_, weight)| weight).sum();
        assert!(total > 0, "weighted table needs at least one positive weight");
        Self { entries, total }
    }

    /// Deterministic pick: position `index mod total` in the expanded list.
    ///
    /// Any `total` consecutive indices yield every value exactly `weight` times.
    pub fn pick_cyclic(&self, index: usize) -> T {
        let slot = (index % self.total as usize) as u32;
        self.at(slot)
    }

    /// Random pick with probability `weight / total`.
    pub fn pick(&self, rng: &mut dyn RngCore) -> T {
        let slot = rng.random_range(0..self.total);
        self.at(slot)
    }

    fn at(&self, mut slot: u32) -> T {
        for (value, weight) in &self.entries {
            if slot < *weight {
                return *value;
            }
            slot -= weight;
        }
        self.entries[self.entries.len() - 1].0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn cyclic_pick_reproduces_weights_exactly() {
        let table = WeightedTable::new(&[("a", 3), ("b", 1), ("c", 0), ("d", 2)]);
        assert_eq!(table.total, 6);

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for index in 12..18 {
            *counts.entry(table.pick_cyclic(index)).or_default() += 1;
        }
        assert_eq!(counts.get("a"), Some(&3));
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(counts.get("c"), None);
        assert_eq!(counts.get("d"), Some(&2));
    }

    #[test]
    fn random_pick_only_returns_weighted_values() {
        let table = WeightedTable::new(&[(1_u8, 1), (2_u8, 0), (3_u8, 4)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen_three = 0;
        for _ in 0..500 {
            let value = table.pick(&mut rng);
            assert_ne!(value, 2);
            if value == 3 {
                seen_three += 1;
            }
        }
        assert!(seen_three > 300, "expected ~400 picks of 3, got {seen_three}");
    }
}
