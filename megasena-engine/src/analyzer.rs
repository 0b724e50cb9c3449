use serde::Serialize;

use megasena_db::error::SenaResult;
use megasena_db::models::{DrawRecord, PICK_COUNT, POOL_SIZE, validate_numbers};

pub const PRIMES: [u8; 17] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59];
pub const FIBONACCI: [u8; 9] = [1, 2, 3, 5, 8, 13, 21, 34, 55];

const ROW_COUNT: usize = 6;
const COLUMN_COUNT: usize = 10;

/// Quadrants de la grille 10×6 : Q1/Q2 en haut (1-30), Q3/Q4 en bas (31-60),
/// Q1/Q3 à gauche (finales 1-5), Q2/Q4 à droite (finales 6-9 et 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quadrant {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quadrant {
    pub fn index(self) -> usize {
        match self {
            Quadrant::Q1 => 0,
            Quadrant::Q2 => 1,
            Quadrant::Q3 => 2,
            Quadrant::Q4 => 3,
        }
    }
}

pub fn quadrant_of(n: u8) -> Quadrant {
    let upper = n <= POOL_SIZE / 2;
    let column = n % 10;
    // Les multiples de 10 sont la dernière colonne de leur ligne : toujours à droite.
    if column == 0 || column >= 6 {
        if upper { Quadrant::Q2 } else { Quadrant::Q4 }
    } else if upper {
        Quadrant::Q1
    } else {
        Quadrant::Q3
    }
}

/// Ligne 1..=6 : `ceil(n/10)`.
pub fn row_of(n: u8) -> u8 {
    n.div_ceil(10)
}

/// Colonne 0..=9 : la finale du numéro (0 pour 10, 20, …, 60).
pub fn column_of(n: u8) -> u8 {
    n % 10
}

pub fn is_prime(n: u8) -> bool {
    PRIMES.contains(&n)
}

pub fn is_fibonacci(n: u8) -> bool {
    FIBONACCI.contains(&n)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedMetrics {
    pub sum: u32,
    pub even_count: u8,
    pub odd_count: u8,
    pub prime_count: u8,
    pub fibonacci_count: u8,
    pub empty_rows: u8,
    pub empty_columns: u8,
    /// Effectifs indexés par `Quadrant::index`.
    pub quadrant_counts: [u8; 4],
    pub empty_quadrants: u8,
    pub quadrant_signature: String,
}

/// Calcule les métriques d'une combinaison brute de 6 numéros.
pub fn analyze(numbers: &[u8]) -> SenaResult<DerivedMetrics> {
    let numbers = validate_numbers(numbers)?;
    Ok(compute(&numbers))
}

/// Les numéros d'un `DrawRecord` sont déjà validés : calcul total.
pub fn analyze_draw(draw: &DrawRecord) -> DerivedMetrics {
    compute(draw.numbers())
}

fn compute(numbers: &[u8; PICK_COUNT]) -> DerivedMetrics {
    let mut rows = [false; ROW_COUNT];
    let mut columns = [false; COLUMN_COUNT];
    let mut quadrant_counts = [0u8; 4];
    let mut sum = 0u32;
    let mut even_count = 0u8;
    let mut prime_count = 0u8;
    let mut fibonacci_count = 0u8;

    for &n in numbers {
        sum += n as u32;
        if n % 2 == 0 {
            even_count += 1;
        }
        if is_prime(n) {
            prime_count += 1;
        }
        if is_fibonacci(n) {
            fibonacci_count += 1;
        }
        rows[(row_of(n) - 1) as usize] = true;
        columns[column_of(n) as usize] = true;
        quadrant_counts[quadrant_of(n).index()] += 1;
    }

    let empty_rows = rows.iter().filter(|&&hit| !hit).count() as u8;
    let empty_columns = columns.iter().filter(|&&hit| !hit).count() as u8;
    let empty_quadrants = quadrant_counts.iter().filter(|&&c| c == 0).count() as u8;

    DerivedMetrics {
        sum,
        even_count,
        odd_count: PICK_COUNT as u8 - even_count,
        prime_count,
        fibonacci_count,
        empty_rows,
        empty_columns,
        quadrant_counts,
        empty_quadrants,
        quadrant_signature: quadrant_signature(&quadrant_counts),
    }
}

/// Effectifs triés par ordre décroissant, joints par `-` (ex : "3-2-1-0").
/// L'identité des quadrants est perdue.
pub fn quadrant_signature(counts: &[u8; 4]) -> String {
    let mut sorted = *counts;
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
