use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use taxdoc::classify::{classify, normalize_text};
use taxdoc::config::AppConfig;
use taxdoc::core::model::IncomeComponents;
use taxdoc::export::{export_outcome, render_report, OutputFormat};
use taxdoc::form1040::Identity;
use taxdoc::parser::PdfReader;
use taxdoc::pipeline::{load_documents, Pipeline};
use taxdoc::tax::{FilingStatus, TaxCalculator, TaxTable};
use taxdoc::text::TextExtractor;

#[derive(Parser, Debug)]
#[command(name = "taxdoc")]
#[command(version, about = "Tax form PDF extraction and 2024 federal tax estimate", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a batch of W-2 / 1099 PDFs and estimate federal tax
    Process {
        /// Input PDF files
        inputs: Vec<PathBuf>,

        /// Filing status (single, married_filing_jointly, ...)
        #[arg(long)]
        filing_status: Option<String>,

        /// Taxpayer name for the Form 1040 lines
        #[arg(long, default_value = "")]
        name: String,

        /// Taxpayer SSN (default: first W-2 employee SSN)
        #[arg(long, default_value = "")]
        ssn: String,

        /// Taxpayer address line
        #[arg(long, default_value = "")]
        address: String,

        /// Output directory for exported results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format(s) to write into the output directory
        #[arg(short, long, value_enum, default_values_t = vec![OutputFormat::Json, OutputFormat::Text])]
        format: Vec<OutputFormat>,

        /// Do not print the report
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the text accepted for a PDF and the stage that produced it
    Extract {
        /// Input PDF file path
        input: PathBuf,
    },

    /// Compute the tax estimate from known totals
    Compute {
        #[arg(long, default_value_t = 0.0)]
        wages: f64,

        #[arg(long, default_value_t = 0.0)]
        interest: f64,

        #[arg(long, default_value_t = 0.0)]
        nec: f64,

        #[arg(long, default_value_t = 0.0)]
        withholding: f64,

        #[arg(long, default_value = "single")]
        filing_status: String,

        /// Tax table TOML (default: bundled 2024 table)
        #[arg(long)]
        table: Option<PathBuf>,
    },

    /// Show information about a PDF file
    Info {
        /// Input PDF file path
        input: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Process {
            inputs,
            filing_status,
            name,
            ssn,
            address,
            output,
            format,
            quiet,
        } => {
            let status = filing_status.unwrap_or_else(|| config.tax.filing_status.clone());
            let identity = Identity {
                taxpayer_name: name,
                taxpayer_ssn: ssn,
                address_line: address,
                filing_status: resolve_status(&status),
            };
            process(&config, inputs, identity, output, format, quiet)
        }
        Commands::Extract { input } => extract(&config, input),
        Commands::Compute {
            wages,
            interest,
            nec,
            withholding,
            filing_status,
            table,
        } => compute(
            IncomeComponents {
                w2_wages: wages,
                interest,
                nec,
            },
            withholding,
            &filing_status,
            table.or_else(|| config.tax.table_path.clone()),
        ),
        Commands::Info { input } => show_info(input),
    }
}

fn resolve_status(raw: &str) -> FilingStatus {
    raw.parse().unwrap_or_else(|err| {
        eprintln!("[!] {err}; using single");
        FilingStatus::Single
    })
}

fn process(
    config: &AppConfig,
    inputs: Vec<PathBuf>,
    identity: Identity,
    output: Option<PathBuf>,
    formats: Vec<OutputFormat>,
    quiet: bool,
) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }
    for input in &inputs {
        if !input.is_file() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
    }

    if !quiet {
        println!("[*] Processing {} file(s) as {}", inputs.len(), identity.filing_status);
    }

    let documents = load_documents(&inputs)?;
    let pipeline = Pipeline::from_config(config)?;
    let outcome = pipeline.process_batch(&documents, &identity);

    if !quiet {
        println!();
        print!("{}", render_report(&outcome));
    }

    if let Some(output_dir) = output {
        export_outcome(&outcome, &output_dir, &formats)
            .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;
        if !quiet {
            println!("\n[✓] Done! Results saved to: {}", output_dir.display());
        }
    }

    Ok(())
}

fn extract(config: &AppConfig, input: PathBuf) -> Result<()> {
    let bytes =
        std::fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let extracted = TextExtractor::from_config(&config.text).extract_text(&bytes);

    match extracted.stage {
        Some(stage) => println!("[*] Stage: {stage}"),
        None => println!("[!] No text recovered"),
    }
    println!("{}", extracted.text);
    Ok(())
}

fn compute(
    income: IncomeComponents,
    withholding: f64,
    filing_status: &str,
    table: Option<PathBuf>,
) -> Result<()> {
    let table = match table {
        Some(path) => TaxTable::from_path(&path)
            .with_context(|| format!("Failed to load tax table {}", path.display()))?,
        None => TaxTable::tax_year_2024()?,
    };
    let result = TaxCalculator::new(table).compute(&income, withholding, resolve_status(filing_status));
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn show_info(input: PathBuf) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let bytes =
        std::fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let reader = PdfReader::from_bytes(&bytes)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;
    let text = reader.page_texts().join("\n");

    println!("PDF Information");
    println!("===============");
    println!("File: {}", input.display());
    println!("Pages: {}", reader.page_count());
    println!("Detected type: {}", classify(&normalize_text(&text)));

    Ok(())
}
