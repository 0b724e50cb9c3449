use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{SenaError, SenaResult};

/// Plus grand numéro tirable.
pub const POOL_SIZE: u8 = 60;
/// Numéros par tirage (et par pari analysé).
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawCategory {
    #[default]
    Ordinary,
    /// Tirage spécial de fin d'année (Mega da Virada).
    Special,
}

impl DrawCategory {
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("virada") {
            DrawCategory::Special
        } else {
            DrawCategory::Ordinary
        }
    }
}

impl std::fmt::Display for DrawCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawCategory::Ordinary => write!(f, "-"),
            DrawCategory::Special => write!(f, "VIRADA"),
        }
    }
}

/// Un tirage historique. Les numéros sont validés à la construction et
/// conservés triés par ordre croissant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawRecord {
    contest: u32,
    date: NaiveDate,
    numbers: [u8; PICK_COUNT],
    category: DrawCategory,
}

impl DrawRecord {
    pub fn new(
        contest: u32,
        date: NaiveDate,
        numbers: &[u8],
        category: DrawCategory,
    ) -> SenaResult<Self> {
        let numbers = validate_numbers(numbers).map_err(|e| match e {
            SenaError::InvalidDraw(msg) => {
                SenaError::InvalidDraw(format!("concours {contest} : {msg}"))
            }
            other => other,
        })?;
        Ok(Self {
            contest,
            date,
            numbers,
            category,
        })
    }

    pub fn contest(&self) -> u32 {
        self.contest
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.numbers
    }

    pub fn category(&self) -> DrawCategory {
        self.category
    }

    pub fn is_special(&self) -> bool {
        self.category == DrawCategory::Special
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.binary_search(&number).is_ok()
    }
}

/// Vérifie qu'il y a exactement 6 numéros distincts dans [1,60] et les
/// retourne triés.
pub fn validate_numbers(numbers: &[u8]) -> SenaResult<[u8; PICK_COUNT]> {
    if numbers.len() != PICK_COUNT {
        return Err(SenaError::InvalidDraw(format!(
            "{} numéros au lieu de {}",
            numbers.len(),
            PICK_COUNT
        )));
    }
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            return Err(SenaError::InvalidDraw(format!(
                "numéro {} hors limites (1-{})",
                n, POOL_SIZE
            )));
        }
    }

    let mut sorted = [0u8; PICK_COUNT];
    sorted.copy_from_slice(numbers);
    sorted.sort_unstable();
    if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(SenaError::InvalidDraw(format!("numéro en double : {}", pair[0])));
    }
    Ok(sorted)
}

/// Historique synthétique, du plus récent au plus ancien (un tirage par jour
/// à rebours depuis le 31/12/2024). Un tirage sur dix est spécial.
pub fn make_test_draws(n: usize) -> Vec<DrawRecord> {
    let newest = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default();
    (0..n)
        .map(|i| {
            let base = (i * 7 % 60) as u8;
            let numbers: Vec<u8> = (0..PICK_COUNT as u8)
                .map(|k| (base + k * 10) % POOL_SIZE + 1)
                .collect();
            let category = if i % 10 == 0 {
                DrawCategory::Special
            } else {
                DrawCategory::Ordinary
            };
            DrawRecord {
                contest: (n - i) as u32,
                date: newest - Duration::days(i as i64),
                numbers: validate_numbers(&numbers).unwrap_or([1, 2, 3, 4, 5, 6]),
                category,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_numbers_ok() {
        assert_eq!(validate_numbers(&[6, 5, 4, 3, 2, 1]).unwrap(), [1, 2, 3, 4, 5, 6]);
        assert!(validate_numbers(&[60, 59, 58, 57, 56, 55]).is_ok());
    }

    #[test]
    fn test_validate_numbers_out_of_range() {
        assert!(validate_numbers(&[0, 2, 3, 4, 5, 6]).is_err());
        assert!(validate_numbers(&[1, 2, 3, 4, 5, 61]).is_err());
    }

    #[test]
    fn test_validate_numbers_wrong_count() {
        assert!(validate_numbers(&[1, 2, 3, 4, 5]).is_err());
        assert!(validate_numbers(&[1, 2, 3, 4, 5, 6, 7]).is_err());
        assert!(validate_numbers(&[]).is_err());
    }

    #[test]
    fn test_validate_numbers_duplicate() {
        let err = validate_numbers(&[1, 1, 3, 4, 5, 6]).unwrap_err();
        assert!(matches!(err, SenaError::InvalidDraw(_)));
    }

    #[test]
    fn test_draw_record_sorts_numbers() {
        let draw = DrawRecord::new(
            2000,
            date(2017, 12, 31),
            &[53, 17, 3, 34, 10, 5],
            DrawCategory::Special,
        )
        .unwrap();
        assert_eq!(draw.numbers(), &[3, 5, 10, 17, 34, 53]);
        assert!(draw.contains(34));
        assert!(!draw.contains(35));
        assert!(draw.is_special());
    }

    #[test]
    fn test_draw_record_error_names_contest() {
        let err = DrawRecord::new(42, date(2020, 1, 1), &[1, 2, 3], DrawCategory::Ordinary)
            .unwrap_err();
        assert!(err.to_string().contains("concours 42"), "{err}");
    }

    #[test]
    fn test_category_from_label() {
        assert_eq!(DrawCategory::from_label("VIRADA"), DrawCategory::Special);
        assert_eq!(DrawCategory::from_label(" virada "), DrawCategory::Special);
        assert_eq!(DrawCategory::from_label("NORMAL"), DrawCategory::Ordinary);
        assert_eq!(DrawCategory::from_label(""), DrawCategory::Ordinary);
    }

    #[test]
    fn test_make_test_draws_newest_first() {
        let draws = make_test_draws(30);
        assert_eq!(draws.len(), 30);
        for w in draws.windows(2) {
            assert!(w[0].date() > w[1].date());
        }
        assert!(draws[0].is_special());
        assert!(!draws[1].is_special());
    }
}
