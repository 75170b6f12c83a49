//! Group brush: several weighted palette entries scattered inside one cell.

use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::palette::{PaletteEntry, PaletteId};

pub const MIN_DENSITY: u32 = 1;
pub const MAX_DENSITY: u32 = 20;

/// One weighted member of a group brush
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBrushEntry {
    pub id: PaletteId,
    pub name: String,
    weight: f32,
}

impl GroupBrushEntry {
    pub fn new(entry: &PaletteEntry, weight: f32) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            weight: clamp_weight(weight),
        }
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Weight is kept in [0, 1]
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = clamp_weight(weight);
    }
}

fn clamp_weight(weight: f32) -> f32 {
    if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) }
}

/// Group brush configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupBrushSet {
    pub enabled: bool,
    /// Instances stamped per cell
    density: u32,
    /// Give every instance its own random turn around up
    pub random_rotation: bool,
    pub entries: Vec<GroupBrushEntry>,
}

impl Default for GroupBrushSet {
    fn default() -> Self {
        Self {
            enabled: false,
            density: MIN_DENSITY,
            random_rotation: false,
            entries: Vec::new(),
        }
    }
}

impl GroupBrushSet {
    pub fn density(&self) -> u32 {
        self.density
    }

    pub fn set_density(&mut self, density: u32) {
        self.density = density.clamp(MIN_DENSITY, MAX_DENSITY);
    }

    /// Add `entry` with full weight unless it is already in the set
    pub fn add(&mut self, entry: &PaletteEntry) -> bool {
        if self.contains(&entry.id) {
            return false;
        }
        self.entries.push(GroupBrushEntry::new(entry, 1.0));
        true
    }

    pub fn remove(&mut self, id: &PaletteId) {
        self.entries.retain(|e| &e.id != id);
    }

    pub fn contains(&self, id: &PaletteId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    /// Weights in entry order
    pub fn weights(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.weight).collect()
    }

    /// Re-apply the clamps after loading from an untrusted blob
    pub fn sanitize(&mut self) {
        self.set_density(self.density);
        for entry in &mut self.entries {
            entry.set_weight(entry.weight);
        }
    }
}

/// Picks an index with probability proportional to its weight.
///
/// Draws `r` uniformly in `[0, total)` and returns the first index whose
/// running sum reaches `r`. The running sums live in a scratch buffer owned
/// by the selector, so a draw never touches the entries themselves.
#[derive(Debug, Clone, Default)]
pub struct WeightedPaletteSelector {
    cumulative: Vec<f64>,
}

impl WeightedPaletteSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` for an empty list. A zero total always yields index 0.
    /// Negative weights count as zero.
    pub fn select_index<R: Rng + ?Sized>(&mut self, weights: &[f32], rng: &mut R) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }

        self.cumulative.clear();
        let mut total = 0.0f64;
        for &w in weights {
            total += f64::from(w.max(0.0));
            self.cumulative.push(total);
        }

        if total <= 0.0 || !total.is_finite() {
            return Some(0);
        }

        let r = rng.gen_range(0.0..total);
        let index = self
            .cumulative
            .iter()
            .position(|&c| c >= r)
            .unwrap_or(weights.len() - 1);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_equal_weights_are_fair() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut selector = WeightedPaletteSelector::new();
        let mut counts = [0usize; 2];
        for _ in 0..10_000 {
            counts[selector.select_index(&[0.5, 0.5], &mut rng).unwrap()] += 1;
        }
        let share = counts[0] as f64 / 10_000.0;
        assert!((share - 0.5).abs() < 0.03, "share {}", share);
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut selector = WeightedPaletteSelector::new();
        for _ in 0..1_000 {
            assert_eq!(selector.select_index(&[1.0, 0.0], &mut rng), Some(0));
        }
    }

    #[test]
    fn test_degenerate_weights() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut selector = WeightedPaletteSelector::new();
        assert_eq!(selector.select_index(&[], &mut rng), None);
        assert_eq!(selector.select_index(&[0.0, 0.0, 0.0], &mut rng), Some(0));
        assert_eq!(selector.select_index(&[0.0, 1.0], &mut rng), Some(1));
    }

    #[test]
    fn test_clamps() {
        let entry = PaletteEntry::new("Props/a.prefab", "Props", "a");
        let mut set = GroupBrushSet::default();
        set.set_density(0);
        assert_eq!(set.density(), 1);
        set.set_density(50);
        assert_eq!(set.density(), 20);

        assert!(set.add(&entry));
        assert!(!set.add(&entry));
        set.entries[0].set_weight(3.0);
        assert_eq!(set.entries[0].weight(), 1.0);
        set.entries[0].set_weight(-1.0);
        assert_eq!(set.entries[0].weight(), 0.0);
    }

    #[test]
    fn test_sanitize_after_load() {
        let json = r#"{"enabled":true,"density":99,"entries":[{"id":"x","name":"x","weight":4.0}]}"#;
        let mut set: GroupBrushSet = serde_json::from_str(json).unwrap();
        set.sanitize();
        assert!(set.enabled);
        assert!(!set.random_rotation);
        assert_eq!(set.density(), 20);
        assert_eq!(set.weights(), vec![1.0]);
    }
}
