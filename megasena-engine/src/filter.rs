use serde::Serialize;

use megasena_db::chrono::Datelike;
use megasena_db::models::DrawRecord;

/// Sous-ensemble de l'historique à analyser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawFilter {
    /// Uniquement les tirages spéciaux (Mega da Virada).
    pub special_only: bool,
    pub year: Option<i32>,
}

impl DrawFilter {
    pub fn matches(&self, draw: &DrawRecord) -> bool {
        if self.special_only && !draw.is_special() {
            return false;
        }
        self.year.is_none_or(|y| draw.date().year() == y)
    }

    /// Conserve l'ordre d'origine, donc l'ordre du plus récent au plus ancien.
    pub fn apply(&self, draws: &[DrawRecord]) -> Vec<DrawRecord> {
        draws.iter().filter(|d| self.matches(d)).cloned().collect()
    }
}

impl std::fmt::Display for DrawFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let period = match self.year {
            Some(y) => y.to_string(),
            None => "toute la période".to_string(),
        };
        if self.special_only {
            write!(f, "Mega da Virada, {period}")
        } else {
            write!(f, "tous les tirages, {period}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megasena_db::models::make_test_draws;

    #[test]
    fn test_default_keeps_everything() {
        let draws = make_test_draws(30);
        assert_eq!(DrawFilter::default().apply(&draws), draws);
    }

    #[test]
    fn test_special_only() {
        let draws = make_test_draws(30);
        let filter = DrawFilter { special_only: true, year: None };
        let kept = filter.apply(&draws);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|d| d.is_special()));
        assert!(kept.windows(2).all(|w| w[0].date() >= w[1].date()));
    }

    #[test]
    fn test_year() {
        // 31/12/2024 à rebours : les 366 premiers jours sont en 2024
        let draws = make_test_draws(400);
        let filter = DrawFilter { special_only: false, year: Some(2024) };
        assert_eq!(filter.apply(&draws).len(), 366);
        let filter = DrawFilter { special_only: false, year: Some(2023) };
        assert_eq!(filter.apply(&draws).len(), 34);
        let filter = DrawFilter { special_only: true, year: Some(2019) };
        assert!(filter.apply(&draws).is_empty());
    }
}
