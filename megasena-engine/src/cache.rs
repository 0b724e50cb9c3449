use std::collections::HashMap;
use std::collections::hash_map::Entry;

use megasena_db::models::{DrawRecord, PICK_COUNT};

use crate::analyzer::{DerivedMetrics, analyze_draw};

/// Mémoïsation des métriques par tirage. Purement une optimisation : le
/// résultat est identique à `analyze_draw`, même si le cache est réutilisé
/// sur un autre historique où un numéro de concours désigne d'autres numéros.
#[derive(Debug, Default)]
pub struct MetricsCache {
    entries: HashMap<(u32, [u8; PICK_COUNT]), DerivedMetrics>,
    hits: u64,
    misses: u64,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, draw: &DrawRecord) -> &DerivedMetrics {
        match self.entries.entry((draw.contest(), *draw.numbers())) {
            Entry::Occupied(e) => {
                self.hits += 1;
                e.into_mut()
            }
            Entry::Vacant(e) => {
                self.misses += 1;
                e.insert(analyze_draw(draw))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (succès, échecs)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
