use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::scorer::Factor;

/// Poids de chaque facteur dans le score agrégé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub sum: f64,
    pub parity: f64,
    pub empty_rows: f64,
    pub empty_columns: f64,
    pub quadrants: f64,
    pub primes: f64,
    pub fibonacci: f64,
    pub hot_cold: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            sum: 2.0,
            parity: 2.0,
            empty_rows: 1.5,
            empty_columns: 1.5,
            quadrants: 1.5,
            primes: 1.0,
            fibonacci: 1.0,
            hot_cold: 1.5,
        }
    }
}

impl FactorWeights {
    pub fn weight(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Sum => self.sum,
            Factor::Parity => self.parity,
            Factor::EmptyRows => self.empty_rows,
            Factor::EmptyColumns => self.empty_columns,
            Factor::Quadrants => self.quadrants,
            Factor::Primes => self.primes,
            Factor::Fibonacci => self.fibonacci,
            Factor::HotCold => self.hot_cold,
        }
    }

    pub fn total(&self) -> f64 {
        Factor::ALL.iter().map(|&f| self.weight(f)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fenêtre de fréquence récente (nombre de tirages).
    pub window: usize,
    /// Un numéro est chaud à partir de ce nombre d'apparitions dans la fenêtre.
    pub hot_min_frequency: u32,
    /// Un numéro est froid à partir de ce retard.
    pub cold_min_lag: u32,
    /// Nombre de signatures de quadrants retenues dans la distribution.
    pub signature_top_n: usize,
    pub weights: FactorWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: 20,
            hot_min_frequency: 3,
            cold_min_lag: 15,
            signature_top_n: 5,
            weights: FactorWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Charge une configuration JSON ; les champs absents prennent leur valeur par défaut.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire la configuration {:?}", path))?;
        let config: EngineConfig = serde_json::from_str(&text)
            .with_context(|| format!("Configuration invalide dans {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.signature_top_n == 0 {
            bail!("signature_top_n doit être > 0");
        }
        for factor in Factor::ALL {
            let w = self.weights.weight(factor);
            if !w.is_finite() || w < 0.0 {
                bail!("Poids invalide pour {} : {}", factor, w);
            }
        }
        if self.weights.total() <= 0.0 {
            bail!("La somme des poids doit être > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.window, 20);
        assert_eq!(config.hot_min_frequency, 3);
        assert_eq!(config.cold_min_lag, 15);
        assert_eq!(config.signature_top_n, 5);
        assert!((config.weights.total() - 12.0).abs() < 1e-10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"window": 30, "weights": {"hot_cold": 0.0}}"#).unwrap();
        assert_eq!(config.window, 30);
        assert_eq!(config.cold_min_lag, 15);
        assert!((config.weights.sum - 2.0).abs() < 1e-10);
        assert_eq!(config.weights.hot_cold, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let mut config = EngineConfig::default();
        config.weights.primes = -1.0;
        assert!(config.validate().is_err());

        let zero: FactorWeights = serde_json::from_str(
            r#"{"sum":0,"parity":0,"empty_rows":0,"empty_columns":0,"quadrants":0,"primes":0,"fibonacci":0,"hot_cold":0}"#,
        )
        .unwrap();
        let config = EngineConfig { weights: zero, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let config = EngineConfig { signature_top_n: 0, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }
}
