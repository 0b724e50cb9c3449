mod display;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use megasena_db::error::SenaError;
use megasena_db::loader::load_draws;
use megasena_db::models::DrawRecord;
use megasena_engine::aggregate::{Bucket, Metric, aggregate_cached, parity_totals, summary};
use megasena_engine::cache::MetricsCache;
use megasena_engine::config::EngineConfig;
use megasena_engine::filter::DrawFilter;
use megasena_engine::hot_cold::track;
use megasena_engine::scorer::score_with;

use crate::display::{
    display_distribution, display_draws, display_evaluation, display_hot_cold,
    display_load_summary, display_summary,
};

#[derive(Parser)]
#[command(name = "megasena", about = "Analyse statistique des tirages de la Mega-Sena")]
struct Cli {
    /// Historique des tirages (.json ou .csv)
    #[arg(short, long, global = true, default_value = "data/mega_sena_data.json")]
    file: PathBuf,

    /// Uniquement les tirages de la Mega da Virada
    #[arg(long, global = true)]
    special_only: bool,

    /// Restreindre l'analyse à une année
    #[arg(short, long, global = true)]
    year: Option<i32>,

    /// Fichier de configuration JSON (seuils et poids)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sortie JSON au lieu des tableaux
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Charger le fichier et afficher le bilan (rejets, doublons)
    Check,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Indicateurs globaux : somme moyenne, numéro le plus fréquent, pairs/impairs
    Summary,

    /// Distribution d'une métrique
    Distribution {
        #[arg(short, long, default_value = "sum")]
        metric: Metric,

        /// Nombre de signatures de quadrants retenues
        #[arg(long)]
        top: Option<usize>,
    },

    /// Distribution de toutes les métriques
    Report,

    /// Fréquence récente et retard de chaque numéro
    HotCold {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Évaluer un pari de 6 numéros
    Score {
        /// Numéros du pari (1-60)
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        numbers: Vec<i64>,

        /// Fenêtre d'analyse pour les numéros chauds
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Afficher la configuration effective
    Config,
}

#[derive(Serialize)]
struct Distribution {
    metric: Metric,
    buckets: Vec<Bucket>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    if let Command::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let loaded = load_draws(&cli.file)?;
    let filter = DrawFilter {
        special_only: cli.special_only,
        year: cli.year,
    };
    let draws = filter.apply(&loaded.draws);
    log::info!("{} tirages retenus ({})", draws.len(), filter);

    let session = Session {
        draws: &draws,
        filter: &filter,
        config: &config,
        json: cli.json,
    };

    match cli.command {
        Command::Check => {
            display_load_summary(&loaded, draws.len());
            Ok(())
        }
        Command::List { last } => cmd_list(&session, last),
        Command::Summary => cmd_summary(&session),
        Command::Distribution { metric, top } => cmd_distribution(&session, metric, top),
        Command::Report => cmd_report(&session),
        Command::HotCold { window } => cmd_hot_cold(&session, window),
        Command::Score { numbers, window } => cmd_score(&session, &numbers, window),
        Command::Config => Ok(()),
    }
}

struct Session<'a> {
    draws: &'a [DrawRecord],
    filter: &'a DrawFilter,
    config: &'a EngineConfig,
    json: bool,
}

impl Session<'_> {
    /// Un historique vide n'est pas agrégé : message neutre à la place.
    fn is_empty(&self) -> bool {
        if self.draws.is_empty() {
            println!("Aucun tirage pour ce filtre ({}).", self.filter);
            return true;
        }
        false
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_list(session: &Session, last: usize) -> Result<()> {
    if session.is_empty() {
        return Ok(());
    }
    let shown = &session.draws[..last.min(session.draws.len())];
    if session.json {
        return print_json(&shown);
    }
    display_draws(shown);
    Ok(())
}

fn cmd_summary(session: &Session) -> Result<()> {
    if session.is_empty() {
        return Ok(());
    }
    let s = summary(session.draws)?;
    let parity = parity_totals(session.draws);
    if session.json {
        return print_json(&serde_json::json!({ "summary": s, "parity": parity }));
    }
    display_summary(&s, &parity, session.filter);
    Ok(())
}

fn cmd_distribution(session: &Session, metric: Metric, top: Option<usize>) -> Result<()> {
    if session.is_empty() {
        return Ok(());
    }
    let top_n = top.unwrap_or(session.config.signature_top_n);
    let mut cache = MetricsCache::new();
    let buckets = aggregate_cached(session.draws, metric, top_n, &mut cache)?;
    if session.json {
        return print_json(&Distribution { metric, buckets });
    }
    display_distribution(metric, &buckets, session.draws.len());
    Ok(())
}

fn cmd_report(session: &Session) -> Result<()> {
    if session.is_empty() {
        return Ok(());
    }
    let mut cache = MetricsCache::new();
    let mut report = Vec::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let buckets = aggregate_cached(session.draws, metric, session.config.signature_top_n, &mut cache)?;
        report.push(Distribution { metric, buckets });
    }
    let (hits, misses) = cache.stats();
    log::debug!("Cache des métriques : {} succès, {} calculs", hits, misses);

    if session.json {
        return print_json(&report);
    }
    for distribution in &report {
        display_distribution(distribution.metric, &distribution.buckets, session.draws.len());
    }
    Ok(())
}

fn cmd_hot_cold(session: &Session, window: Option<usize>) -> Result<()> {
    if session.is_empty() {
        return Ok(());
    }
    let window = window.unwrap_or(session.config.window);
    let stats = track(session.draws, window)?;
    if session.json {
        return print_json(&stats);
    }
    display_hot_cold(&stats, session.config, window.min(session.draws.len()));
    Ok(())
}

/// Les saisies hors de la grille sont écartées ici comme dans `collect_bet` :
/// le pari devient simplement incomplet.
fn bet_numbers(raw: &[i64]) -> Vec<u8> {
    raw.iter().filter_map(|&n| u8::try_from(n).ok()).collect()
}

fn cmd_score(session: &Session, numbers: &[i64], window: Option<usize>) -> Result<()> {
    let window = window.unwrap_or(session.config.window);
    let stats = track(session.draws, window)?;
    match score_with(&bet_numbers(numbers), &stats, session.config) {
        Ok(evaluation) => {
            if session.json {
                return print_json(&evaluation);
            }
            display_evaluation(&evaluation);
            Ok(())
        }
        Err(SenaError::IncompleteBet { valid }) => {
            println!("Pari pas encore évaluable : {valid} numéro(s) valide(s) sur 6.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megasena_engine::scorer::collect_bet;

    #[test]
    fn test_out_of_range_bet_is_incomplete() {
        let raw = [4, 10, 23, 31, 42, 300];
        assert_eq!(bet_numbers(&raw), vec![4, 10, 23, 31, 42]);
        assert_eq!(
            collect_bet(&bet_numbers(&raw)),
            Err(SenaError::IncompleteBet { valid: 5 })
        );
        assert_eq!(
            collect_bet(&bet_numbers(&[-1, 4, 10, 23, 31, 42])),
            Err(SenaError::IncompleteBet { valid: 5 })
        );
        assert_eq!(
            collect_bet(&bet_numbers(&[4, 10, 23, 31, 42, 61])),
            Err(SenaError::IncompleteBet { valid: 5 })
        );
    }

    #[test]
    fn test_cli_parses_large_bet_numbers() {
        let cli = Cli::try_parse_from(["megasena", "score", "4", "10", "23", "31", "42", "300"]).unwrap();
        match cli.command {
            Command::Score { numbers, .. } => assert_eq!(numbers, vec![4, 10, 23, 31, 42, 300]),
            _ => panic!("sous-commande inattendue"),
        }
    }
}
