mod batch;
mod db;
mod error;
mod export;
mod parser;
mod settings;
mod source;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use settings::Settings;
use source::{FileSource, PageSource};

#[derive(Parser)]
#[command(name = "bible_pdf_parser", about = "Recover book/chapter/verse records from Bible PDFs")]
struct Cli {
    /// Config file (default: ./bible_pdf_parser.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a batch of PDF (or .txt) files and write every output format
    Process {
        /// Input documents
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Max characters per block
        #[arg(short = 'm', long)]
        max_block_chars: Option<usize>,
        /// Also write a category-tagged line dump per document
        #[arg(long)]
        tagged: bool,
    },
    /// Print every line of a document with its category
    Classify {
        file: PathBuf,
    },
    /// Print the reference recovered from a single line
    Extract {
        text: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            files,
            out,
            max_block_chars,
            tagged,
        } => {
            let mut settings = Settings::load(cli.config.as_deref())?;
            if let Some(dir) = out {
                settings.output_dir = dir;
            }
            if let Some(max) = max_block_chars {
                settings.max_block_chars = max;
            }
            settings.validate()?;
            info!(settings = ?settings, "Starting batch");

            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
                    .progress_chars("#>-"),
            );
            let batch = batch::run_batch(&files, &FileSource, &settings, Some(&pb));
            pb.finish_and_clear();

            for doc in &batch.report.documents {
                println!("{}", doc.summary());
            }
            let written = export::write_all(&batch, &settings, tagged)?;

            let structured = batch.report.structured_records();
            if structured > 0 {
                println!(
                    "\nDataset generated: {} verses in {} blocks.",
                    structured, batch.report.total_blocks
                );
            } else if batch.documents.is_empty() {
                println!("\nNo document could be read.");
            } else {
                println!("\nNo verses detected; raw text was saved.");
            }
            println!("{} files written to {}", written.len(), settings.output_dir.display());
            Ok(())
        }
        Commands::Classify { file } => {
            let pages = FileSource
                .pages(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let output = parser::process_document(&batch::display_name(&file), &pages);
            print!("{}", export::tagged_lines(&output.lines));
            println!(
                "\n{} lines, {} structural, {} orphan, {} records{}",
                output.lines.len(),
                output.structural_lines,
                output.orphan_lines,
                output.records.len(),
                if output.structured { "" } else { " (unstructured)" }
            );
            Ok(())
        }
        Commands::Extract { text } => {
            let reference = parser::reference::extract_full(&text);
            let reference = if reference.is_empty() {
                parser::reference::extract(&text)
            } else {
                reference
            };
            if reference.is_empty() {
                bail!("no reference found in {:?}", text);
            }
            println!("{}", serde_json::to_string_pretty(&reference)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
