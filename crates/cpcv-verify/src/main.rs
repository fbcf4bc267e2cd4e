//! CPCV validation CLI
//!
//! Cross-checks a promissory contract against owner, buyer and property
//! documents with a multimodal model.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use cpcv_backend::{ContentExtractor, DocumentExtractor};
use cpcv_core::{
    reconcile_with, Category, ContentFragment, EntityStatus, OverallStatus, ReconcileOptions,
    Reconciliation, Severity, UploadSet, UploadedFile,
};
use cpcv_verify::{parse_report, Validator, ValidatorConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "cpcv-verify")]
#[command(about = "Validate a CPCV against its source documents")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a contract against owner, buyer and property documents
    Validate {
        /// Owner identification documents
        #[arg(long, num_args = 1..)]
        owner: Vec<PathBuf>,

        /// Buyer identification documents
        #[arg(long, num_args = 1..)]
        buyer: Vec<PathBuf>,

        /// Property documents (caderneta, certidão, certificado energético)
        #[arg(long, num_args = 1..)]
        property: Vec<PathBuf>,

        /// The CPCV itself (draft or signed)
        #[arg(long, num_args = 1..)]
        contract: Vec<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model identifier (default: $CPCV_MODEL or gpt-4o)
        #[arg(long)]
        model: Option<String>,

        /// PDF page scale factor
        #[arg(long)]
        scale: Option<f32>,

        /// Upgrade MISMATCH entity summaries whose corrected lists all match
        #[arg(long)]
        recompute_entity_status: bool,

        /// Run even if a category has no documents
        #[arg(long)]
        allow_missing: bool,
    },

    /// Show the content a set of files converts into
    Extract {
        /// Category the files belong to
        #[arg(short, long, default_value = "contract")]
        category: Category,

        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Re-run reconciliation over a saved model answer
    Reconcile {
        /// Report JSON (a Markdown code fence is tolerated)
        report: PathBuf,

        /// Write the reconciled report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Upgrade MISMATCH entity summaries whose corrected lists all match
        #[arg(long)]
        recompute_entity_status: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cpcv_verify=info".parse()?),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Validate {
            owner,
            buyer,
            property,
            contract,
            output,
            model,
            scale,
            recompute_entity_status,
            allow_missing,
        } => {
            let files = load_upload_set(&[
                (Category::Owner, owner),
                (Category::Buyer, buyer),
                (Category::Property, property),
                (Category::Contract, contract),
            ])?;
            let missing = files.missing_categories();
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(|c| c.title()).collect();
                if !allow_missing {
                    anyhow::bail!(
                        "No documents for: {}. Pass --allow-missing to validate anyway.",
                        names.join(", ")
                    );
                }
                eprintln!("{} no documents for {}", "Warning:".yellow().bold(), names.join(", "));
            }

            let mut config = ValidatorConfig::from_env();
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(scale) = scale {
                config.render_scale = scale;
            }
            let options = ReconcileOptions {
                recompute_entity_status,
            };
            validate(&config, &files, options, output.as_deref()).await?;
        }
        Command::Extract { category, files } => {
            extract(category, &files)?;
        }
        Command::Reconcile {
            report,
            output,
            recompute_entity_status,
        } => {
            let options = ReconcileOptions {
                recompute_entity_status,
            };
            reconcile_file(&report, options, output.as_deref())?;
        }
    }

    Ok(())
}

/// Guess a media type from content, falling back to the extension.
fn media_type(path: &Path, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("docx") => cpcv_backend::format::DOCX_MIME,
        Some("doc") => cpcv_backend::format::DOC_MIME,
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string()
}

fn load_file(category: Category, path: &Path) -> Result<UploadedFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().to_string(),
    );
    let media_type = media_type(path, &bytes);
    Ok(UploadedFile::new(category, name, media_type, bytes))
}

fn load_upload_set(groups: &[(Category, Vec<PathBuf>)]) -> Result<UploadSet> {
    let mut files = UploadSet::new();
    for (category, paths) in groups {
        for path in paths {
            files.add(load_file(*category, path)?);
        }
    }
    Ok(files)
}

async fn validate(
    config: &ValidatorConfig,
    files: &UploadSet,
    options: ReconcileOptions,
    output: Option<&Path>,
) -> Result<()> {
    let client = config
        .openai_client()
        .context("OPENAI_API_KEY not set. Export OPENAI_API_KEY with your API key")?;
    let extractor = DocumentExtractor::new().with_options(config.render_options());
    let validator = Validator::new(Arc::new(extractor), Arc::new(client)).with_options(options);

    let reconciliation = match validator.validate_detailed(files).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e.user_message());
            return Err(e.into());
        }
    };

    write_report(&reconciliation, output)?;
    print_summary(&reconciliation);
    Ok(())
}

fn extract(category: Category, paths: &[PathBuf]) -> Result<()> {
    let extractor = DocumentExtractor::new();
    for path in paths {
        let file = load_file(category, path)?;
        let fragments = extractor.extract(&file)?;
        println!("{} ({})", file.name().bold(), file.media_type());
        if fragments.is_empty() {
            println!("  {}", "no content (unsupported type)".dimmed());
        }
        for (i, fragment) in fragments.iter().enumerate() {
            match fragment {
                ContentFragment::Image { mime_type, .. } => {
                    println!("  [{}] image {mime_type} {} bytes", i + 1, fragment.byte_len());
                }
                ContentFragment::Text { text, .. } => {
                    let first_line = text.lines().next().unwrap_or_default();
                    println!("  [{}] text {} bytes: {first_line}", i + 1, fragment.byte_len());
                }
            }
        }
    }
    Ok(())
}

fn reconcile_file(path: &Path, options: ReconcileOptions, output: Option<&Path>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let report = parse_report(&raw).with_context(|| format!("Failed to parse {}", path.display()))?;
    let reconciliation = reconcile_with(report, &options);
    info!(
        corrected = reconciliation.corrected_comparisons,
        removed = reconciliation.removed_discrepancies,
        upgraded = reconciliation.upgraded_entities,
        "Reconciled {}",
        path.display()
    );

    write_report(&reconciliation, output)?;
    print_summary(&reconciliation);
    Ok(())
}

fn write_report(reconciliation: &Reconciliation, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&reconciliation.report)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn print_summary(reconciliation: &Reconciliation) {
    let report = &reconciliation.report;
    let status = match report.overall_status {
        OverallStatus::Valid => "VALID".green().bold(),
        OverallStatus::Invalid => "INVALID".red().bold(),
        OverallStatus::ReviewNeeded => "REVIEW NEEDED".yellow().bold(),
    };
    eprintln!("\n{status}  {}", report.summary);

    for (label, entity) in [
        ("Proprietários", &report.entities.owners),
        ("Compradores", &report.entities.buyers),
        ("Imóvel", &report.entities.property),
    ] {
        let mark = match entity.status {
            EntityStatus::Match => "MATCH".green(),
            EntityStatus::Mismatch => "MISMATCH".red(),
            EntityStatus::Missing => "MISSING".yellow(),
        };
        eprintln!("  {label:<14} {mark}  {}", entity.notes);
    }

    if !report.discrepancies.is_empty() {
        eprintln!("\n{}", "Discrepâncias:".bold());
        for d in &report.discrepancies {
            let severity = match d.severity {
                Severity::Critical => "CRITICAL".red(),
                Severity::Warning => "WARNING".yellow(),
                Severity::Info => "INFO".cyan(),
            };
            eprintln!(
                "  [{severity}] {}: {} vs {}",
                d.field,
                d.source_doc_value.as_deref().unwrap_or("-"),
                d.cpcv_value.as_deref().unwrap_or("-")
            );
        }
    }

    if !report.missing_documents_data.is_empty() {
        eprintln!("\n{}", "Dados sem comprovativo:".bold());
        for item in &report.missing_documents_data {
            eprintln!("  - {item}");
        }
    }

    if reconciliation.changed() {
        eprintln!(
            "\n{} {} comparisons corrected, {} discrepancies removed, {} entities upgraded",
            "Auto-correction:".cyan().bold(),
            reconciliation.corrected_comparisons,
            reconciliation.removed_discrepancies,
            reconciliation.upgraded_entities
        );
    }
}
