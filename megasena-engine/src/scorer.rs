use std::collections::BTreeMap;

use serde::Serialize;

use megasena_db::error::{SenaError, SenaResult};
use megasena_db::models::{PICK_COUNT, POOL_SIZE, validate_numbers};

use crate::analyzer::{DerivedMetrics, analyze};
use crate::config::EngineConfig;
use crate::hot_cold::{NumberStat, Temperature};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Sum,
    Parity,
    EmptyRows,
    EmptyColumns,
    Quadrants,
    Primes,
    Fibonacci,
    HotCold,
}

impl Factor {
    pub const ALL: [Factor; 8] = [
        Factor::Sum,
        Factor::Parity,
        Factor::EmptyRows,
        Factor::EmptyColumns,
        Factor::Quadrants,
        Factor::Primes,
        Factor::Fibonacci,
        Factor::HotCold,
    ];
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Factor::Sum => write!(f, "Somme"),
            Factor::Parity => write!(f, "Pairs/Impairs"),
            Factor::EmptyRows => write!(f, "Lignes vides"),
            Factor::EmptyColumns => write!(f, "Colonnes vides"),
            Factor::Quadrants => write!(f, "Quadrants"),
            Factor::Primes => write!(f, "Premiers"),
            Factor::Fibonacci => write!(f, "Fibonacci"),
            Factor::HotCold => write!(f, "Chauds/Froids"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Safe,
    Warning,
    Risk,
}

impl Status {
    pub fn points(self) -> f64 {
        match self {
            Status::Safe => 1.0,
            Status::Warning => 0.5,
            Status::Risk => 0.0,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Safe => write!(f, "OK"),
            Status::Warning => write!(f, "ATTENTION"),
            Status::Risk => write!(f, "RISQUE"),
        }
    }
}

// Bandes ±1σ / ±2σ autour de la moyenne théorique 183 (σ ≈ 40).
const SUM_SAFE: (u32, u32) = (143, 223);
const SUM_WARNING: (u32, u32) = (103, 263);

pub fn classify_sum(sum: u32) -> Status {
    if (SUM_SAFE.0..=SUM_SAFE.1).contains(&sum) {
        Status::Safe
    } else if (SUM_WARNING.0..=SUM_WARNING.1).contains(&sum) {
        Status::Warning
    } else {
        Status::Risk
    }
}

pub fn classify_parity(even_count: u8) -> Status {
    if (2..=4).contains(&even_count) {
        Status::Safe
    } else {
        Status::Risk
    }
}

pub fn classify_empty_rows(empty_rows: u8) -> Status {
    if matches!(empty_rows, 1 | 2) {
        Status::Safe
    } else {
        Status::Warning
    }
}

pub fn classify_empty_columns(empty_columns: u8) -> Status {
    if matches!(empty_columns, 4 | 5) {
        Status::Safe
    } else {
        Status::Warning
    }
}

/// "2-2-1-1" (aucun quadrant vide) et "3-2-1-0" (un vide) sont tous deux
/// acceptés ; deux quadrants vides ou plus signalent une concentration.
pub fn classify_quadrants(empty_quadrants: u8) -> Status {
    if empty_quadrants <= 1 {
        Status::Safe
    } else {
        Status::Risk
    }
}

pub fn classify_primes(prime_count: u8) -> Status {
    match prime_count {
        0..=2 => Status::Safe,
        3 => Status::Warning,
        _ => Status::Risk,
    }
}

pub fn classify_fibonacci(fibonacci_count: u8) -> Status {
    match fibonacci_count {
        0..=1 => Status::Safe,
        2 => Status::Warning,
        _ => Status::Risk,
    }
}

pub fn classify_hot_cold(hot_count: u8, cold_count: u8) -> Status {
    if hot_count <= 1 && cold_count <= 1 {
        Status::Safe
    } else {
        Status::Warning
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorEvaluation {
    pub factor: Factor,
    pub status: Status,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberTemperature {
    pub number: u8,
    pub temperature: Temperature,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetEvaluation {
    pub numbers: [u8; PICK_COUNT],
    pub metrics: DerivedMetrics,
    pub factors: Vec<FactorEvaluation>,
    pub temperatures: Vec<NumberTemperature>,
    pub hot_count: u8,
    pub cold_count: u8,
    /// Score pondéré sur [0, 100].
    pub score: u8,
}

impl BetEvaluation {
    pub fn status(&self, factor: Factor) -> Option<Status> {
        self.factors.iter().find(|f| f.factor == factor).map(|f| f.status)
    }

    pub fn statuses(&self) -> BTreeMap<Factor, Status> {
        self.factors.iter().map(|f| (f.factor, f.status)).collect()
    }
}

/// Extrait les numéros valides et distincts d'une saisie. Une saisie partielle
/// n'est pas évaluable ; plus de 6 numéros n'est pas une combinaison analysable.
pub fn collect_bet(bet: &[u8]) -> SenaResult<[u8; PICK_COUNT]> {
    let mut valid: Vec<u8> = bet
        .iter()
        .copied()
        .filter(|n| (1..=POOL_SIZE).contains(n))
        .collect();
    valid.sort_unstable();
    valid.dedup();
    if valid.len() < PICK_COUNT {
        return Err(SenaError::IncompleteBet { valid: valid.len() });
    }
    validate_numbers(&valid)
}

/// Évalue un pari avec les seuils et poids par défaut.
pub fn score(bet: &[u8], hot_cold: &[NumberStat]) -> SenaResult<BetEvaluation> {
    score_with(bet, hot_cold, &EngineConfig::default())
}

pub fn score_with(
    bet: &[u8],
    hot_cold: &[NumberStat],
    config: &EngineConfig,
) -> SenaResult<BetEvaluation> {
    let numbers = collect_bet(bet)?;
    let metrics = analyze(&numbers)?;

    check_hot_cold(hot_cold)?;

    let temperatures: Vec<NumberTemperature> = numbers
        .iter()
        .map(|&number| NumberTemperature {
            number,
            temperature: hot_cold[(number - 1) as usize]
                .temperature(config.hot_min_frequency, config.cold_min_lag),
        })
        .collect();
    let hot_count = count_temperature(&temperatures, Temperature::Hot);
    let cold_count = count_temperature(&temperatures, Temperature::Cold);

    let factors: Vec<FactorEvaluation> = Factor::ALL
        .iter()
        .map(|&factor| {
            let status = match factor {
                Factor::Sum => classify_sum(metrics.sum),
                Factor::Parity => classify_parity(metrics.even_count),
                Factor::EmptyRows => classify_empty_rows(metrics.empty_rows),
                Factor::EmptyColumns => classify_empty_columns(metrics.empty_columns),
                Factor::Quadrants => classify_quadrants(metrics.empty_quadrants),
                Factor::Primes => classify_primes(metrics.prime_count),
                Factor::Fibonacci => classify_fibonacci(metrics.fibonacci_count),
                Factor::HotCold => classify_hot_cold(hot_count, cold_count),
            };
            FactorEvaluation {
                factor,
                status,
                weight: config.weights.weight(factor),
            }
        })
        .collect();

    let total_weight: f64 = factors.iter().map(|f| f.weight).sum();
    let earned: f64 = factors.iter().map(|f| f.status.points() * f.weight).sum();
    let score = if total_weight > 0.0 {
        (100.0 * earned / total_weight).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    Ok(BetEvaluation {
        numbers,
        metrics,
        factors,
        temperatures,
        hot_count,
        cold_count,
        score,
    })
}

/// Attend la sortie de `track` : une entrée par numéro, indexée par `number - 1`.
fn check_hot_cold(hot_cold: &[NumberStat]) -> SenaResult<()> {
    let complete = hot_cold.len() == POOL_SIZE as usize
        && hot_cold.iter().zip(1..=POOL_SIZE).all(|(s, n)| s.number == n);
    if complete {
        Ok(())
    } else {
        Err(SenaError::InvalidHotCold { found: hot_cold.len() })
    }
}

fn count_temperature(temperatures: &[NumberTemperature], wanted: Temperature) -> u8 {
    temperatures.iter().filter(|t| t.temperature == wanted).count() as u8
}
