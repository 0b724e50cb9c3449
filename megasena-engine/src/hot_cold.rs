use serde::Serialize;

use megasena_db::error::{SenaError, SenaResult};
use megasena_db::models::{DrawRecord, POOL_SIZE};

pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberStat {
    pub number: u8,
    /// Apparitions dans les `window` tirages les plus récents.
    pub recent_frequency: u32,
    /// Tirages écoulés depuis la dernière apparition. Vaut la taille de
    /// l'historique si le numéro n'y apparaît pas.
    pub lag: u32,
    /// Apparitions sur tout l'historique fourni.
    pub frequency: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Hot,
    Cold,
    Neutral,
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temperature::Hot => write!(f, "HOT"),
            Temperature::Cold => write!(f, "COLD"),
            Temperature::Neutral => write!(f, "-"),
        }
    }
}

impl NumberStat {
    /// Chaud prime sur froid.
    pub fn temperature(&self, hot_min_frequency: u32, cold_min_lag: u32) -> Temperature {
        if self.recent_frequency >= hot_min_frequency {
            Temperature::Hot
        } else if self.lag >= cold_min_lag {
            Temperature::Cold
        } else {
            Temperature::Neutral
        }
    }
}

/// Vérifie que draws[0] est le plus récent : dates non croissantes.
pub fn check_newest_first(draws: &[DrawRecord]) -> SenaResult<()> {
    match draws.windows(2).position(|w| w[1].date() > w[0].date()) {
        Some(i) => Err(SenaError::UnorderedHistory { index: i + 1 }),
        None => Ok(()),
    }
}

/// Fréquence récente et retard des 60 numéros. draws[0] = tirage le plus récent.
pub fn track(draws: &[DrawRecord], window: usize) -> SenaResult<Vec<NumberStat>> {
    check_newest_first(draws)?;

    let total = draws.len() as u32;
    let mut stats: Vec<NumberStat> = (1..=POOL_SIZE)
        .map(|n| NumberStat {
            number: n,
            recent_frequency: 0,
            lag: total,
            frequency: 0,
        })
        .collect();

    for (i, draw) in draws.iter().enumerate() {
        for &n in draw.numbers() {
            let stat = &mut stats[(n - 1) as usize];
            stat.frequency += 1;
            if i < window {
                stat.recent_frequency += 1;
            }
            if stat.lag == total {
                stat.lag = i as u32;
            }
        }
    }

    log::debug!(
        "Chaud/froid : {} tirages, fenêtre effective {}",
        total,
        window.min(draws.len())
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use megasena_db::chrono::NaiveDate;
    use megasena_db::models::{DrawCategory, make_test_draws};

    fn draw(contest: u32, day: u32, numbers: &[u8]) -> DrawRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        DrawRecord::new(contest, date, numbers, DrawCategory::Ordinary).unwrap()
    }

    #[test]
    fn test_track_returns_sixty() {
        let stats = track(&make_test_draws(30), DEFAULT_WINDOW).unwrap();
        assert_eq!(stats.len(), 60);
        for (i, s) in stats.iter().enumerate() {
            assert_eq!(s.number as usize, i + 1);
        }
    }

    #[test]
    fn test_single_draw() {
        let draws = vec![draw(1, 1, &[4, 10, 23, 31, 42, 55])];
        let stats = track(&draws, DEFAULT_WINDOW).unwrap();
        for s in &stats {
            if draws[0].contains(s.number) {
                assert_eq!(s.lag, 0);
                assert_eq!(s.recent_frequency, 1);
            } else {
                assert_eq!(s.lag, 1);
                assert_eq!(s.recent_frequency, 0);
            }
        }
    }

    #[test]
    fn test_lag_properties() {
        let draws = make_test_draws(40);
        let stats = track(&draws, DEFAULT_WINDOW).unwrap();
        for s in &stats {
            assert_eq!(s.lag == 0, draws[0].contains(s.number), "numéro {}", s.number);
            let absent = draws.iter().all(|d| !d.contains(s.number));
            assert_eq!(s.lag == 40, absent, "numéro {}", s.number);
            if !absent {
                assert!(draws[s.lag as usize].contains(s.number));
                assert!(draws[..s.lag as usize].iter().all(|d| !d.contains(s.number)));
            }
        }
    }

    #[test]
    fn test_recent_frequency_window() {
        let draws = vec![
            draw(4, 4, &[1, 2, 3, 4, 5, 6]),
            draw(3, 3, &[1, 2, 3, 7, 8, 9]),
            draw(2, 2, &[1, 2, 10, 11, 12, 13]),
            draw(1, 1, &[1, 20, 21, 22, 23, 24]),
        ];
        let stats = track(&draws, 2).unwrap();
        assert_eq!(stats[0].recent_frequency, 2);
        assert_eq!(stats[0].frequency, 4);
        assert_eq!(stats[1].recent_frequency, 2);
        assert_eq!(stats[9].recent_frequency, 0);
        assert_eq!(stats[9].lag, 2);
        assert_eq!(stats[19].lag, 3);
        assert_eq!(stats[59].lag, 4);

        // Fenêtre plus large que l'historique
        let stats = track(&draws, 100).unwrap();
        assert_eq!(stats[0].recent_frequency, 4);
    }

    #[test]
    fn test_empty_history() {
        let stats = track(&[], DEFAULT_WINDOW).unwrap();
        assert_eq!(stats.len(), 60);
        assert!(stats.iter().all(|s| s.lag == 0 && s.recent_frequency == 0));
    }

    #[test]
    fn test_reversed_history_rejected() {
        let mut draws = make_test_draws(10);
        draws.reverse();
        assert_eq!(
            track(&draws, DEFAULT_WINDOW),
            Err(SenaError::UnorderedHistory { index: 1 })
        );
    }

    #[test]
    fn test_same_day_allowed() {
        let draws = vec![draw(2, 5, &[1, 2, 3, 4, 5, 6]), draw(1, 5, &[7, 8, 9, 10, 11, 12])];
        assert!(track(&draws, DEFAULT_WINDOW).is_ok());
    }

    #[test]
    fn test_temperature_hot_takes_precedence() {
        let stat = NumberStat { number: 7, recent_frequency: 3, lag: 20, frequency: 3 };
        assert_eq!(stat.temperature(3, 15), Temperature::Hot);
        let stat = NumberStat { number: 7, recent_frequency: 2, lag: 15, frequency: 2 };
        assert_eq!(stat.temperature(3, 15), Temperature::Cold);
        let stat = NumberStat { number: 7, recent_frequency: 2, lag: 14, frequency: 2 };
        assert_eq!(stat.temperature(3, 15), Temperature::Neutral);
    }
}
