use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use megasena_db::loader::LoadResult;
use megasena_db::models::DrawRecord;
use megasena_engine::aggregate::{Bucket, HistorySummary, Metric, ParityTotals};
use megasena_engine::analyzer::analyze_draw;
use megasena_engine::config::EngineConfig;
use megasena_engine::filter::DrawFilter;
use megasena_engine::hot_cold::{NumberStat, Temperature};
use megasena_engine::scorer::{BetEvaluation, Status};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_load_summary(result: &LoadResult, kept: usize) {
    println!("Chargement terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Tirages valides   : {}", result.draws.len());
    println!("  Doublons ignorés  : {}", result.duplicates);
    if result.rejected > 0 {
        println!("  Rejetés           : {}", result.rejected);
    }
    println!("  Retenus (filtre)  : {}", kept);
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Concours", "Date", "Dezenas", "Type", "Somme", "Quadrants"]);
    for draw in draws {
        let metrics = analyze_draw(draw);
        table.add_row(vec![
            draw.contest().to_string(),
            draw.date().format("%d/%m/%Y").to_string(),
            format_numbers(draw.numbers()),
            draw.category().to_string(),
            metrics.sum.to_string(),
            metrics.quadrant_signature,
        ]);
    }
    println!("{table}");
}

pub fn display_summary(summary: &HistorySummary, parity: &ParityTotals, filter: &DrawFilter) {
    println!("\n📊 Tirages analysés : {} ({})", summary.total, filter);
    println!(
        "   Période          : {} → {}",
        summary.oldest.format("%d/%m/%Y"),
        summary.newest.format("%d/%m/%Y")
    );
    println!("   Somme moyenne    : {} (intervalle idéal : 160 - 200)", summary.average_sum);
    println!(
        "   Dezena la plus fréquente : #{:02} ({} apparitions)",
        summary.top_number, summary.top_number_count
    );

    let total = (parity.even + parity.odd).max(1) as f64;
    println!(
        "   Pairs / Impairs  : {} ({:.1} %) / {} ({:.1} %)",
        parity.even,
        100.0 * parity.even as f64 / total,
        parity.odd,
        100.0 * parity.odd as f64 / total
    );
}

pub fn display_distribution(metric: Metric, buckets: &[Bucket], total: usize) {
    println!("\n── {} ({} tirages) ──", metric, total);

    let mut table = new_table(vec!["Valeur", "Tirages", "%", ""]);
    for bucket in buckets {
        let bar = "█".repeat((bucket.percent / 2.0).round() as usize);
        table.add_row(vec![
            bucket.key.to_string(),
            bucket.count.to_string(),
            format!("{:.1}", bucket.percent),
            bar,
        ]);
    }
    println!("{table}");
}

fn temperature_cell(temperature: Temperature) -> Cell {
    let color = match temperature {
        Temperature::Hot => Color::Red,
        Temperature::Cold => Color::Cyan,
        Temperature::Neutral => Color::White,
    };
    Cell::new(temperature.to_string()).fg(color)
}

pub fn display_hot_cold(stats: &[NumberStat], config: &EngineConfig, window: usize) {
    println!(
        "\n🔥 Chauds (≥ {} sur {} tirages) / froids (retard ≥ {})\n",
        config.hot_min_frequency, window, config.cold_min_lag
    );

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| {
        b.recent_frequency
            .cmp(&a.recent_frequency)
            .then_with(|| a.lag.cmp(&b.lag))
            .then_with(|| a.number.cmp(&b.number))
    });

    let mut table = new_table(vec!["Numéro", "Fréq. récente", "Retard", "Fréq. totale", "Tag"]);
    for stat in &sorted {
        table.add_row(vec![
            Cell::new(format!("{:02}", stat.number)),
            Cell::new(stat.recent_frequency),
            Cell::new(stat.lag),
            Cell::new(stat.frequency),
            temperature_cell(stat.temperature(config.hot_min_frequency, config.cold_min_lag)),
        ]);
    }
    println!("{table}");
}

fn status_cell(status: Status) -> Cell {
    let color = match status {
        Status::Safe => Color::Green,
        Status::Warning => Color::Yellow,
        Status::Risk => Color::Red,
    };
    Cell::new(status.to_string()).fg(color)
}

pub fn display_evaluation(evaluation: &BetEvaluation) {
    let m = &evaluation.metrics;
    println!("\n🎯 Pari {}\n", format_numbers(&evaluation.numbers));

    let details = [
        m.sum.to_string(),
        format!("{} pairs / {} impairs", m.even_count, m.odd_count),
        m.empty_rows.to_string(),
        m.empty_columns.to_string(),
        format!("{} ({} vide(s))", m.quadrant_signature, m.empty_quadrants),
        m.prime_count.to_string(),
        m.fibonacci_count.to_string(),
        format!("{} chaud(s) / {} froid(s)", evaluation.hot_count, evaluation.cold_count),
    ];

    let mut table = new_table(vec!["Facteur", "Valeur", "Poids", "Statut"]);
    for (factor, detail) in evaluation.factors.iter().zip(details) {
        table.add_row(vec![
            Cell::new(factor.factor.to_string()),
            Cell::new(detail),
            Cell::new(format!("{:.1}", factor.weight)),
            status_cell(factor.status),
        ]);
    }
    println!("{table}");

    let flagged: Vec<String> = evaluation
        .temperatures
        .iter()
        .filter(|t| t.temperature != Temperature::Neutral)
        .map(|t| format!("{:02} {}", t.number, t.temperature))
        .collect();
    if !flagged.is_empty() {
        println!("Numéros marqués : {}", flagged.join(", "));
    }

    println!("\nScore : {}/100", evaluation.score);
}
