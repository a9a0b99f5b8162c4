//! Command-line interface for the harvester.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{
    validate_date, HarvestConfig, DEFAULT_KEY_PREFIX, DEFAULT_PART, DEFAULT_SUBPARTS,
    DEFAULT_TITLE, ECFR_API_URL,
};
use crate::error::{HarvesterError, Result};
use crate::harvester::{extraction_timestamp, harvest, section_document, HarvestReport, RunContext};
use crate::http::create_client;
use crate::storage::{DocumentSink, FilesystemSink, HttpObjectSink};
use crate::summarize::{LlmSummarizer, Summarizer, SummarizerConfig};
use crate::xml::parse_subpart;

/// eCFR Harvester - Download CFR sections and rebuild their citation outline.
#[derive(Parser)]
#[command(name = "ecfr-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download subparts from eCFR and store one JSON document per section.
    Harvest {
        /// CFR title number
        #[arg(short, long, default_value_t = DEFAULT_TITLE)]
        title: u32,

        /// CFR part number
        #[arg(short, long, default_value = DEFAULT_PART)]
        part: String,

        /// Subpart label, repeatable (default: A through E)
        #[arg(short, long = "subpart")]
        subparts: Vec<String>,

        /// Output directory for the documents
        #[arg(short, long, default_value = "output", conflicts_with = "bucket_url")]
        output: PathBuf,

        /// Upload documents to this object store URL instead of writing files
        #[arg(long)]
        bucket_url: Option<String>,

        /// Bearer token for the object store
        #[arg(long, requires = "bucket_url")]
        bucket_token: Option<String>,

        /// Ask the LLM API for a one-sentence description of each section
        #[arg(long)]
        summarize: bool,

        /// Facility type written to document metadata
        #[arg(long)]
        facility_type: Option<String>,

        /// Storage key prefix
        #[arg(long, default_value = DEFAULT_KEY_PREFIX)]
        key_prefix: String,

        /// eCFR API base URL
        #[arg(long, default_value = ECFR_API_URL)]
        api_url: String,
    },

    /// Rebuild section documents from a local subpart XML file.
    Parse {
        /// Subpart XML file
        input: PathBuf,

        /// Subpart label of the file
        #[arg(short, long, default_value = "A")]
        subpart: String,

        /// Only output this section (e.g., 482.12)
        #[arg(long)]
        section: Option<String>,

        /// CFR title number
        #[arg(short, long, default_value_t = DEFAULT_TITLE)]
        title: u32,

        /// CFR part number
        #[arg(short, long, default_value = DEFAULT_PART)]
        part: String,

        /// Version date in YYYY-MM-DD format (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            title,
            part,
            subparts,
            output,
            bucket_url,
            bucket_token,
            summarize,
            facility_type,
            key_prefix,
            api_url,
        } => {
            let mut config = HarvestConfig::new(title, part)
                .with_key_prefix(key_prefix)
                .with_api_base_url(api_url);
            config = if subparts.is_empty() {
                config.with_subparts(DEFAULT_SUBPARTS)
            } else {
                config.with_subparts(subparts)
            };
            if let Some(facility_type) = facility_type {
                config = config.with_facility_type(facility_type);
            }
            let destination = match bucket_url {
                Some(url) => Destination::Bucket {
                    url,
                    token: bucket_token,
                },
                None => Destination::Directory(output),
            };
            harvest_command(&config, destination, summarize)
        }
        Commands::Parse {
            input,
            subpart,
            section,
            title,
            part,
            date,
            output,
        } => {
            let config = HarvestConfig::new(title, part).with_subparts([subpart.as_str()]);
            parse_command(
                &config,
                &input,
                &subpart,
                section.as_deref(),
                date.as_deref(),
                output.as_deref(),
            )
        }
    }
}

/// Where harvested documents go.
enum Destination {
    Directory(PathBuf),
    Bucket { url: String, token: Option<String> },
}

/// Execute the harvest command.
fn harvest_command(config: &HarvestConfig, destination: Destination, summarize: bool) -> Result<()> {
    // Validate inputs before making HTTP requests
    config.validate()?;

    let client = create_client()?;

    let sink: Box<dyn DocumentSink> = match destination {
        Destination::Directory(dir) => {
            if dir.exists() && !dir.is_dir() {
                return Err(HarvesterError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Output path is not a directory: {}", dir.display()),
                )));
            }
            Box::new(FilesystemSink::new(dir))
        }
        Destination::Bucket { url, token } => {
            let sink = HttpObjectSink::new(client.clone(), url);
            Box::new(match token {
                Some(token) => sink.with_bearer_token(token),
                None => sink,
            })
        }
    };

    let summarizer = if summarize {
        Some(LlmSummarizer::new(&SummarizerConfig::from_env()?)?)
    } else {
        None
    };

    println!(
        "{} title {} part {} subparts {}",
        style("Harvesting").bold(),
        style(config.title).cyan(),
        style(&config.part).cyan(),
        style(config.subparts.join(", ")).green()
    );
    println!();

    let pb = spinner("Downloading title catalog and subparts...");

    let report = match harvest(
        config,
        &client,
        summarizer.as_ref().map(|s| s as &dyn Summarizer),
        sink.as_ref(),
    ) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();
    print_report(&report);

    let failed = report.failures().len();
    if failed > 0 {
        return Err(HarvesterError::Incomplete {
            failed,
            stored: report.stored_count(),
        });
    }
    Ok(())
}

/// Execute the parse command.
fn parse_command(
    config: &HarvestConfig,
    input: &Path,
    subpart_label: &str,
    section_id: Option<&str>,
    date: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    // Use today if no date provided
    let version_date = date
        .map(String::from)
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

    // Validate inputs before reading the file
    validate_date(&version_date)?;
    config.validate()?;

    let xml = fs::read_to_string(input)?;
    let subpart = parse_subpart(&xml, subpart_label)?;

    let sections: Vec<_> = subpart
        .sections
        .iter()
        .filter(|s| section_id.is_none_or(|id| s.id == id))
        .collect();

    if let (Some(id), true) = (section_id, sections.is_empty()) {
        return Err(HarvesterError::MissingElement {
            element: format!("section {id}"),
            context: input.display().to_string(),
        });
    }

    let extraction_date = extraction_timestamp();
    let context = RunContext {
        config,
        version_date: &version_date,
        extraction_date: &extraction_date,
    };

    let documents = sections
        .into_iter()
        .map(|section| section_document(&context, &subpart, section, None))
        .collect::<Result<Vec<_>>>()?;

    let json = serde_json::to_string_pretty(&documents)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!(
                "{} {} document(s) to {}",
                style("Wrote").green().bold(),
                documents.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn print_report(report: &HarvestReport) {
    println!("  Version: {}", style(&report.version_date).green());
    for subpart in &report.subparts {
        match &subpart.error {
            Some(_) => println!(
                "  Subpart {}: {}",
                subpart.label,
                style("failed").red().bold()
            ),
            None => println!(
                "  Subpart {} ({}): {} sections",
                subpart.label,
                subpart.name,
                subpart.sections.len()
            ),
        }
    }
    println!("  Stored: {}", style(report.stored_count()).green().bold());

    let failures = report.failures();
    if !failures.is_empty() {
        println!("  Failures: {}", style(failures.len()).yellow().bold());
        for (location, message) in failures {
            println!("    {}: {message}", style(location).yellow());
        }
    }
}
