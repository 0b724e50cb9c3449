use std::collections::BTreeMap;

use serde::Serialize;

use megasena_db::chrono::NaiveDate;
use megasena_db::error::{SenaError, SenaResult};
use megasena_db::models::{DrawRecord, POOL_SIZE};

use crate::analyzer::{DerivedMetrics, analyze_draw};
use crate::cache::MetricsCache;

pub const DEFAULT_SIGNATURE_TOP_N: usize = 5;

/// Largeur des tranches de somme.
const SUM_BUCKET_WIDTH: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sum,
    EvenCount,
    OddCount,
    PrimeCount,
    FibonacciCount,
    EmptyRows,
    EmptyColumns,
    QuadrantSignature,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Sum,
        Metric::EvenCount,
        Metric::OddCount,
        Metric::PrimeCount,
        Metric::FibonacciCount,
        Metric::EmptyRows,
        Metric::EmptyColumns,
        Metric::QuadrantSignature,
    ];

    pub fn key_of(&self, metrics: &DerivedMetrics) -> BucketKey {
        match self {
            Metric::Sum => BucketKey::Numeric(metrics.sum / SUM_BUCKET_WIDTH * SUM_BUCKET_WIDTH),
            Metric::EvenCount => BucketKey::Numeric(metrics.even_count as u32),
            Metric::OddCount => BucketKey::Numeric(metrics.odd_count as u32),
            Metric::PrimeCount => BucketKey::Numeric(metrics.prime_count as u32),
            Metric::FibonacciCount => BucketKey::Numeric(metrics.fibonacci_count as u32),
            Metric::EmptyRows => BucketKey::Numeric(metrics.empty_rows as u32),
            Metric::EmptyColumns => BucketKey::Numeric(metrics.empty_columns as u32),
            Metric::QuadrantSignature => BucketKey::Signature(metrics.quadrant_signature.clone()),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Sum => write!(f, "Somme (tranches de 10)"),
            Metric::EvenCount => write!(f, "Pairs"),
            Metric::OddCount => write!(f, "Impairs"),
            Metric::PrimeCount => write!(f, "Premiers"),
            Metric::FibonacciCount => write!(f, "Fibonacci"),
            Metric::EmptyRows => write!(f, "Lignes vides"),
            Metric::EmptyColumns => write!(f, "Colonnes vides"),
            Metric::QuadrantSignature => write!(f, "Signature des quadrants"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum BucketKey {
    Numeric(u32),
    Signature(String),
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketKey::Numeric(v) => write!(f, "{v}"),
            BucketKey::Signature(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub count: u32,
    /// Pourcentage du total, arrondi à une décimale.
    pub percent: f64,
}

/// Distribution d'une métrique sur l'historique. Les métriques numériques sont
/// triées par clé croissante ; la signature des quadrants par effectif
/// décroissant, limitée aux `top_n` premières.
pub fn aggregate(draws: &[DrawRecord], metric: Metric, top_n: usize) -> SenaResult<Vec<Bucket>> {
    let keys = draws.iter().map(|d| metric.key_of(&analyze_draw(d)));
    build_buckets(keys, draws.len(), metric, top_n)
}

/// Comme `aggregate`, en réutilisant les métriques déjà calculées.
pub fn aggregate_cached(
    draws: &[DrawRecord],
    metric: Metric,
    top_n: usize,
    cache: &mut MetricsCache,
) -> SenaResult<Vec<Bucket>> {
    let keys: Vec<BucketKey> = draws.iter().map(|d| metric.key_of(cache.get(d))).collect();
    build_buckets(keys, draws.len(), metric, top_n)
}

fn build_buckets(
    keys: impl IntoIterator<Item = BucketKey>,
    total: usize,
    metric: Metric,
    top_n: usize,
) -> SenaResult<Vec<Bucket>> {
    if total == 0 {
        return Err(SenaError::EmptyDataset);
    }

    let mut counts: BTreeMap<BucketKey, u32> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut buckets: Vec<Bucket> = counts
        .into_iter()
        .map(|(key, count)| Bucket {
            key,
            count,
            percent: percent_of(count, total),
        })
        .collect();

    if metric == Metric::QuadrantSignature {
        buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        buckets.truncate(top_n);
    }

    log::debug!("{} : {} tranches sur {} tirages", metric, buckets.len(), total);
    Ok(buckets)
}

fn percent_of(count: u32, total: usize) -> f64 {
    (1000.0 * count as f64 / total as f64).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total: usize,
    /// Somme moyenne arrondie à l'entier.
    pub average_sum: u32,
    /// Numéro le plus fréquent (le plus petit en cas d'égalité).
    pub top_number: u8,
    pub top_number_count: u32,
    pub oldest: NaiveDate,
    pub newest: NaiveDate,
}

pub fn summary(draws: &[DrawRecord]) -> SenaResult<HistorySummary> {
    let first = draws.first().ok_or(SenaError::EmptyDataset)?;

    let mut counts = [0u32; POOL_SIZE as usize + 1];
    let mut total_sum = 0u64;
    let mut oldest = first.date();
    let mut newest = first.date();

    for draw in draws {
        for &n in draw.numbers() {
            counts[n as usize] += 1;
            total_sum += n as u64;
        }
        oldest = oldest.min(draw.date());
        newest = newest.max(draw.date());
    }

    let mut top_number = 1u8;
    for n in 2..=POOL_SIZE {
        if counts[n as usize] > counts[top_number as usize] {
            top_number = n;
        }
    }

    Ok(HistorySummary {
        total: draws.len(),
        average_sum: (total_sum as f64 / draws.len() as f64).round() as u32,
        top_number,
        top_number_count: counts[top_number as usize],
        oldest,
        newest,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ParityTotals {
    pub even: u32,
    pub odd: u32,
}

/// Total des numéros pairs et impairs sur toute la période.
pub fn parity_totals(draws: &[DrawRecord]) -> ParityTotals {
    draws
        .iter()
        .flat_map(|d| d.numbers().iter())
        .fold(ParityTotals::default(), |mut acc, &n| {
            if n % 2 == 0 {
                acc.even += 1;
            } else {
                acc.odd += 1;
            }
            acc
        })
}
