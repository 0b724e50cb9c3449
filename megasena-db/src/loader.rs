use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{DrawCategory, DrawRecord};

/// Les exports de résultats écrivent les dezenas tantôt en entiers, tantôt
/// en chaînes zéro-paddées ("04").
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Text(String),
}

impl RawNumber {
    fn to_u32(&self) -> Result<u32> {
        match self {
            RawNumber::Int(v) => u32::try_from(*v).with_context(|| format!("Valeur hors limites : {}", v)),
            RawNumber::Text(s) => s
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Impossible de parser '{}'", s)),
        }
    }

    fn to_u8(&self) -> Result<u8> {
        let v = self.to_u32()?;
        u8::try_from(v).with_context(|| format!("Numéro hors limites : {}", v))
    }
}

#[derive(Debug, Deserialize)]
struct RawDraw {
    #[serde(alias = "contest")]
    concurso: RawNumber,
    #[serde(alias = "date")]
    data: String,
    #[serde(alias = "numbers")]
    dezenas: Vec<RawNumber>,
    #[serde(alias = "category", default)]
    tipo: Option<String>,
}

impl RawDraw {
    fn into_record(self) -> Result<DrawRecord> {
        let contest = self.concurso.to_u32()?;
        let date = parse_date(&self.data)?;
        let numbers = self
            .dezenas
            .iter()
            .map(RawNumber::to_u8)
            .collect::<Result<Vec<_>>>()?;
        let category = DrawCategory::from_label(self.tipo.as_deref().unwrap_or_default());
        Ok(DrawRecord::new(contest, date, &numbers, category)?)
    }
}

#[derive(Debug, Default)]
pub struct LoadResult {
    /// Tirages valides, du plus récent au plus ancien.
    pub draws: Vec<DrawRecord>,
    pub total_records: u32,
    pub duplicates: u32,
    pub rejected: u32,
}

impl LoadResult {
    fn push(&mut self, draw: DrawRecord, seen: &mut HashSet<u32>) {
        if seen.insert(draw.contest()) {
            self.draws.push(draw);
        } else {
            log::debug!("Concours {} en double ignoré", draw.contest());
            self.duplicates += 1;
        }
    }

    fn reject(&mut self, line: u32, err: &anyhow::Error) {
        log::warn!("Tirage {} ignoré : {:#}", line, err);
        self.rejected += 1;
    }

    fn finish(mut self) -> Self {
        sort_newest_first(&mut self.draws);
        self
    }
}

/// Trie par date décroissante puis par concours décroissant.
pub fn sort_newest_first(draws: &mut [DrawRecord]) {
    draws.sort_by(|a, b| {
        b.date()
            .cmp(&a.date())
            .then_with(|| b.contest().cmp(&a.contest()))
    });
}

/// Charge un historique depuis un fichier `.json` ou `.csv`.
pub fn load_draws(path: &Path) -> Result<LoadResult> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let result = match extension.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Impossible de lire {:?}", path))?;
            parse_json(&text)?
        }
        "csv" => {
            let file = File::open(path).with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
            read_csv(file)?
        }
        other => bail!("Format de fichier non supporté : '{}' (json ou csv attendu)", other),
    };

    log::info!(
        "{} tirages chargés depuis {:?} ({} rejetés, {} doublons)",
        result.draws.len(),
        path,
        result.rejected,
        result.duplicates
    );
    Ok(result)
}

/// Parse un tableau JSON de tirages. Un enregistrement malformé est journalisé
/// et ignoré, sans interrompre le chargement.
pub fn parse_json(text: &str) -> Result<LoadResult> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(text).context("JSON invalide : un tableau de tirages est attendu")?;

    let mut result = LoadResult::default();
    let mut seen = HashSet::new();

    for value in values {
        result.total_records += 1;
        let parsed = serde_json::from_value::<RawDraw>(value)
            .map_err(anyhow::Error::from)
            .and_then(RawDraw::into_record);
        match parsed {
            Ok(draw) => result.push(draw, &mut seen),
            Err(e) => result.reject(result.total_records, &e),
        }
    }

    Ok(result.finish())
}

fn parse_record(record: &csv::StringRecord) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let contest_str = get(0)?;
    let contest: u32 = contest_str
        .parse()
        .with_context(|| format!("Concours invalide : '{}'", contest_str))?;
    let date = parse_date(get(1)?)?;
    let numbers = (2..8).map(get_u8).collect::<Result<Vec<_>>>()?;
    let category = DrawCategory::from_label(get(8).unwrap_or_default());

    Ok(DrawRecord::new(contest, date, &numbers, category)?)
}

/// Lit un CSV `;` avec en-tête : `contest;date;n1;…;n6;category`.
pub fn read_csv<R: Read>(input: R) -> Result<LoadResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(input);

    let mut result = LoadResult::default();
    let mut seen = HashSet::new();

    for record_result in reader.records() {
        result.total_records += 1;
        let parsed = record_result
            .map_err(anyhow::Error::from)
            .and_then(|record| parse_record(&record));
        match parsed {
            Ok(draw) => result.push(draw, &mut seen),
            Err(e) => result.reject(result.total_records, &e),
        }
    }

    Ok(result.finish())
}

/// Accepte `AAAA-MM-JJ` (éventuellement suivi d'une heure) ou `JJ/MM/AAAA`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let iso = raw.get(..10).unwrap_or(raw);
    if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        return Ok(date);
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .with_context(|| format!("Format de date invalide : '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"[
        {"concurso": 2669, "data": "2023-12-31", "dezenas": ["21", "24", "33", "41", "48", "56"], "tipo": "VIRADA",
         "analises": {"soma": 223, "pares": 4, "impares": 2}},
        {"concurso": 2670, "data": "2024-01-03", "dezenas": [4, 10, 23, 31, 42, 55], "tipo": "NORMAL"},
        {"contest": 2671, "date": "2024-01-06", "numbers": [1, 2, 3, 4, 5, 6]}
    ]"#;

    #[test]
    fn test_parse_json_sorted_newest_first() {
        let result = parse_json(SAMPLE_JSON).unwrap();
        assert_eq!(result.total_records, 3);
        assert_eq!(result.rejected, 0);
        let contests: Vec<u32> = result.draws.iter().map(|d| d.contest()).collect();
        assert_eq!(contests, vec![2671, 2670, 2669]);
        assert!(result.draws[2].is_special());
        assert_eq!(result.draws[2].numbers(), &[21, 24, 33, 41, 48, 56]);
        assert_eq!(result.draws[0].category(), DrawCategory::Ordinary);
    }

    #[test]
    fn test_parse_json_skips_invalid_records() {
        let json = r#"[
            {"concurso": 1, "data": "2024-01-01", "dezenas": [1, 2, 3, 4, 5, 61]},
            {"concurso": 2, "data": "2024-01-02", "dezenas": [1, 1, 3, 4, 5, 6]},
            {"concurso": 3, "data": "pas une date", "dezenas": [1, 2, 3, 4, 5, 6]},
            {"concurso": 4, "dezenas": [1, 2, 3, 4, 5, 6]},
            {"concurso": 5, "data": "2024-01-05", "dezenas": [7, 8, 9, 10, 11, 12]}
        ]"#;
        let result = parse_json(json).unwrap();
        assert_eq!(result.total_records, 5);
        assert_eq!(result.rejected, 4);
        assert_eq!(result.draws.len(), 1);
        assert_eq!(result.draws[0].contest(), 5);
    }

    #[test]
    fn test_parse_json_duplicate_ignored() {
        let json = r#"[
            {"concurso": 7, "data": "2024-01-01", "dezenas": [1, 2, 3, 4, 5, 6]},
            {"concurso": 7, "data": "2024-01-01", "dezenas": [1, 2, 3, 4, 5, 6]}
        ]"#;
        let result = parse_json(json).unwrap();
        assert_eq!(result.draws.len(), 1);
        assert_eq!(result.duplicates, 1);
    }

    #[test]
    fn test_parse_json_not_an_array() {
        assert!(parse_json(r#"{"concurso": 1}"#).is_err());
    }

    #[test]
    fn test_read_csv() {
        let csv = "contest;date;n1;n2;n3;n4;n5;n6;category\n\
                   10;03/01/2024;4;10;23;31;42;55;\n\
                   11;2024-01-06;60;1;30;31;15;16;VIRADA\n\
                   12;2024-01-09;1;2;3\n";
        let result = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(result.total_records, 3);
        assert_eq!(result.rejected, 1);
        assert_eq!(result.draws.len(), 2);
        assert_eq!(result.draws[0].contest(), 11);
        assert!(result.draws[0].is_special());
        assert_eq!(result.draws[1].numbers(), &[4, 10, 23, 31, 42, 55]);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        assert_eq!(parse_date("2026-02-17").unwrap(), expected);
        assert_eq!(parse_date("17/02/2026").unwrap(), expected);
        assert_eq!(parse_date("2026-02-17T20:00:00").unwrap(), expected);
        assert!(parse_date("2026/02/17").is_err());
    }

    #[test]
    fn test_load_draws_unknown_extension() {
        assert!(load_draws(Path::new("tirages.txt")).is_err());
    }
}
