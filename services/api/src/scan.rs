use crate::infra::scan_service;
use bottlescan::config::AppConfig;
use bottlescan::error::AppError;
use bottlescan::ingredients::parse_label_text;
use bottlescan::recommend::SkinProfile;
use bottlescan::reference::ReferenceData;
use bottlescan::scan::{ScanReport, ScanRequest};
use bottlescan::source::SourceStatus;
use clap::{ArgGroup, Args};
use std::fmt::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["ingredients", "text_file"])
))]
pub(crate) struct ScanArgs {
    /// Comma-separated ingredient list, in label order
    #[arg(long)]
    pub(crate) ingredients: Option<String>,
    /// File holding label text (as extracted by OCR)
    #[arg(long)]
    pub(crate) text_file: Option<PathBuf>,
    /// Skin type to match product recommendations against (repeatable)
    #[arg(long = "skin-type")]
    pub(crate) skin_type: Vec<String>,
    /// Skin concern to favour in recommendations (repeatable)
    #[arg(long)]
    pub(crate) concern: Vec<String>,
    /// Load reference datasets from this directory instead of the bundled seed data
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    #[arg(long)]
    pub(crate) max_substitutes: Option<usize>,
    #[arg(long)]
    pub(crate) max_products: Option<usize>,
    /// Print the raw JSON report
    #[arg(long)]
    pub(crate) json: bool,
}

impl ScanArgs {
    fn ingredients(&self) -> Result<Vec<String>, AppError> {
        if let Some(path) = &self.text_file {
            let text = std::fs::read_to_string(path)?;
            return Ok(parse_label_text(&text));
        }
        Ok(self
            .ingredients
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn profile(&self) -> Option<SkinProfile> {
        if self.skin_type.is_empty() {
            return None;
        }
        Some(SkinProfile::new(
            self.skin_type.iter().cloned(),
            self.concern.iter().cloned(),
        ))
    }
}

pub(crate) async fn run_scan(args: ScanArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = args.data_dir.clone() {
        config.datasets.data_dir = Some(dir);
    }

    let reference = ReferenceData::load(&config.datasets)?;
    let service = scan_service(&reference, config.scan);

    let request = ScanRequest {
        ingredients: args.ingredients()?,
        profile: args.profile(),
        max_substitutes: args.max_substitutes,
        max_products: args.max_products,
    };
    let report = service.scan(request).await?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        let rendered = render_report(&report).map_err(std::io::Error::other)?;
        print!("{rendered}");
    }
    Ok(())
}

pub(crate) fn render_report(report: &ScanReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let analysis = &report.analysis;

    writeln!(out, "BottleScan report (dataset {})", report.dataset_version)?;
    writeln!(
        out,
        "Aggregate score: {}/100 ({})",
        analysis.aggregate_score, analysis.interpretation
    )?;
    writeln!(
        out,
        "Position-weighted score: {:.1}",
        analysis.position_weighted_score
    )?;

    writeln!(out, "\nIngredients")?;
    for ingredient in &analysis.ingredients {
        let marker = if ingredient.is_flagged() { " [flagged]" } else { "" };
        writeln!(
            out,
            "- {}: {} ({}){}",
            ingredient.canonical_name,
            ingredient.score,
            ingredient.category.label(),
            marker
        )?;
    }

    if report.substitutes.is_empty() {
        writeln!(out, "\nSubstitutes: nothing flagged")?;
    } else {
        writeln!(out, "\nSubstitutes")?;
        for entry in &report.substitutes {
            match &entry.status {
                SourceStatus::Available if entry.substitutes.is_empty() => {
                    writeln!(out, "- {}: no known substitutes", entry.ingredient)?;
                }
                SourceStatus::Available => {
                    writeln!(out, "- {}", entry.ingredient)?;
                    for candidate in &entry.substitutes {
                        writeln!(
                            out,
                            "    {} ({}): {}",
                            candidate.name, candidate.score, candidate.description
                        )?;
                    }
                }
                SourceStatus::Unavailable { reason } | SourceStatus::Skipped { reason } => {
                    writeln!(out, "- {}: unavailable ({})", entry.ingredient, reason)?;
                }
            }
        }
    }

    match &report.recommendations.status {
        SourceStatus::Available if report.recommendations.products.is_empty() => {
            writeln!(out, "\nRecommended products: no matches")?;
        }
        SourceStatus::Available => {
            writeln!(out, "\nRecommended products")?;
            for product in &report.recommendations.products {
                writeln!(
                    out,
                    "- {} {} (id {}): match {:.2}, health {}, rating {:.1}, {} {}",
                    product.brand,
                    product.name,
                    product.product_id,
                    product.substitute_score,
                    product.health_score,
                    product.rating,
                    product.average_price,
                    product.currency
                )?;
            }
        }
        SourceStatus::Unavailable { reason } => {
            writeln!(out, "\nRecommended products: unavailable ({reason})")?;
        }
        SourceStatus::Skipped { reason } => {
            writeln!(out, "\nRecommended products: skipped ({reason})")?;
        }
    }

    Ok(out)
}
