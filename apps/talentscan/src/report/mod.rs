//! Report renderer — writes the ranked analysis sheet, the cohort summary and a JSON dump.
//!
//! Ranking and scores come in already computed; nothing here re-sorts or re-scores.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::ScoreBands;
use crate::errors::AppError;
use crate::screening::aggregate::round2;
use crate::screening::cohort::{CohortSummary, TOP_N};
use crate::screening::profile::JobProfile;

const NOT_INFORMED: &str = "Não informado";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Good,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn classify(score: f64, bands: &ScoreBands) -> Self {
        if score >= bands.good {
            ScoreBand::Good
        } else if score >= bands.medium {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Good => "alta",
            ScoreBand::Medium => "média",
            ScoreBand::Low => "baixa",
        }
    }
}

/// Files produced by one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub analysis: PathBuf,
    pub summary: PathBuf,
    pub json: PathBuf,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: &'a str,
    generated_at: DateTime<Utc>,
    profile: &'a JobProfile,
    summary: &'a CohortSummary,
}

pub struct ReportWriter {
    bands: ScoreBands,
}

impl ReportWriter {
    pub fn new(bands: ScoreBands) -> Self {
        Self { bands }
    }

    /// `analise_curriculos_<timestamp>` inside `output_dir`.
    pub fn default_stem(output_dir: &Path, now: DateTime<Utc>) -> PathBuf {
        output_dir.join(format!(
            "analise_curriculos_{}",
            now.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Writes `<stem>.csv`, `<stem>_resumo.csv` and `<stem>.json`.
    /// Any extension on `stem` is replaced.
    pub fn write(
        &self,
        stem: &Path,
        run_id: &str,
        profile: &JobProfile,
        summary: &CohortSummary,
    ) -> Result<ReportPaths, AppError> {
        let stem = stem.with_extension("");
        if let Some(parent) = stem.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let paths = ReportPaths {
            analysis: stem.with_extension("csv"),
            summary: suffixed(&stem, "_resumo", "csv")?,
            json: stem.with_extension("json"),
        };

        self.write_analysis(&paths.analysis, profile, summary)?;
        self.write_summary(&paths.summary, summary)?;

        let report = JsonReport {
            run_id,
            generated_at: Utc::now(),
            profile,
            summary,
        };
        let writer = BufWriter::new(File::create(&paths.json)?);
        serde_json::to_writer_pretty(writer, &report)?;

        info!("Report saved to {}", paths.analysis.display());
        Ok(paths)
    }

    fn write_analysis(
        &self,
        path: &Path,
        profile: &JobProfile,
        summary: &CohortSummary,
    ) -> Result<(), AppError> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec![
            "Nome".to_string(),
            "E-mail".to_string(),
            "Telefone".to_string(),
            "Arquivo".to_string(),
            "Pontuação Total".to_string(),
            "Faixa".to_string(),
        ];
        header.extend(profile.attributes().map(|attr| format!("Nota - {attr}")));
        header.push("Camada de Análise".to_string());
        header.push("Resumo das Qualidades".to_string());
        writer.write_record(&header)?;

        for candidate in &summary.top_ranked {
            let contact = &candidate.contact;
            let mut row = vec![
                contact.name.clone().unwrap_or_else(|| NOT_INFORMED.to_string()),
                contact.email.clone().unwrap_or_else(|| NOT_INFORMED.to_string()),
                contact.phone.clone().unwrap_or_else(|| NOT_INFORMED.to_string()),
                candidate.source_file.clone(),
                format!("{:.2}", candidate.total_score),
                ScoreBand::classify(candidate.total_score, &self.bands)
                    .label()
                    .to_string(),
            ];
            row.extend(profile.attributes().map(|attr| {
                candidate
                    .analysis
                    .scores
                    .get(attr)
                    .copied()
                    .unwrap_or(0)
                    .to_string()
            }));
            row.push(candidate.analysis.tier.as_str().to_string());
            row.push(candidate.analysis.summary.clone());
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_summary(&self, path: &Path, summary: &CohortSummary) -> Result<(), AppError> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["ESTATÍSTICAS GERAIS", ""])?;
        writer.write_record(["Total de Candidatos".to_string(), summary.count.to_string()])?;
        writer.write_record([
            "Pontuação Média".to_string(),
            format!("{:.2}", round2(summary.average_score)),
        ])?;
        writer.write_record(["", ""])?;

        writer.write_record([format!("TOP {TOP_N} CANDIDATOS"), String::new()])?;
        for (position, candidate) in summary.top(TOP_N).iter().enumerate() {
            let name = candidate
                .contact
                .name
                .as_deref()
                .unwrap_or(NOT_INFORMED);
            writer.write_record([
                format!("{}º lugar", position + 1),
                format!("{name} - {:.2} pontos", candidate.total_score),
            ])?;
        }
        writer.write_record(["", ""])?;

        writer.write_record(["ATRIBUTOS MAIS BEM AVALIADOS", ""])?;
        let mut attributes: Vec<_> = summary.per_attribute_average.iter().collect();
        attributes.sort_by(|a, b| b.1.total_cmp(a.1));
        for (attr, average) in attributes {
            writer.write_record([attr.clone(), format!("{:.2} pontos", round2(*average))])?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn suffixed(stem: &Path, suffix: &str, extension: &str) -> Result<PathBuf, AppError> {
    let name = stem
        .file_name()
        .ok_or_else(|| AppError::Report(format!("invalid output path: {}", stem.display())))?
        .to_string_lossy();
    Ok(stem.with_file_name(format!("{name}{suffix}.{extension}")))
}
