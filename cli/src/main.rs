//! examdocx CLI - exam paper export tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use log::warn;

use examdocx::render::{load_paper, load_template, save_json};
use examdocx::{
    export_bundle, DirAssetStore, ExamDocx, JsonDirStore, Paper, PaperStore, RenderMode,
    RenderOptions,
};

#[derive(Parser)]
#[command(name = "examdocx")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Validate, preview, and export exam papers to DOCX", long_about = None)]
struct Cli {
    /// Data directory (papers, templates, uploads)
    #[arg(long, global = true, env = "EXAMDOCX_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a paper to DOCX
    Export {
        /// Paper JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Asset directory (defaults to <data-dir>/uploads)
        #[arg(long, value_name = "DIR", env = "EXAMDOCX_ASSETS_DIR")]
        assets: Option<PathBuf>,

        /// Export the answer key instead of the paper
        #[arg(long, conflicts_with = "both")]
        answer_key: bool,

        /// Export both the paper and the answer key
        #[arg(long)]
        both: bool,
    },

    /// Check a paper for errors without exporting
    Validate {
        /// Paper JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Create a new paper, optionally from a template
    New {
        /// Template JSON file to start from
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Paper title
        #[arg(long)]
        title: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also save the paper to the data directory
        #[arg(long)]
        save: bool,
    },

    /// Print a plain-text preview of the laid-out paper
    Preview {
        /// Paper JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Asset directory (defaults to <data-dir>/uploads)
        #[arg(long, value_name = "DIR", env = "EXAMDOCX_ASSETS_DIR")]
        assets: Option<PathBuf>,

        /// Preview the answer key
        #[arg(long)]
        answer_key: bool,
    },

    /// Show paper information
    Info {
        /// Paper JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List papers and templates in the data directory
    List,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir;

    let result = match cli.command {
        Commands::Export {
            input,
            output,
            assets,
            answer_key,
            both,
        } => cmd_export(
            &input,
            output.as_deref(),
            &assets_dir(&data_dir, assets),
            answer_key,
            both,
        ),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::New {
            template,
            title,
            output,
            save,
        } => cmd_new(
            template.as_deref(),
            title,
            output.as_deref(),
            save.then_some(data_dir.as_path()),
        ),
        Commands::Preview {
            input,
            assets,
            answer_key,
        } => cmd_preview(&input, &assets_dir(&data_dir, assets), answer_key),
        Commands::Info { input, json } => cmd_info(&input, json),
        Commands::List => cmd_list(&data_dir),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn assets_dir(data_dir: &Path, assets: Option<PathBuf>) -> PathBuf {
    assets.unwrap_or_else(|| data_dir.join("uploads"))
}

fn mode(answer_key: bool) -> RenderMode {
    if answer_key {
        RenderMode::AnswerKey
    } else {
        RenderMode::Full
    }
}

fn cmd_export(
    input: &Path,
    output: Option<&Path>,
    assets: &Path,
    answer_key: bool,
    both: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let paper = load_paper(input)?;
    let store = DirAssetStore::open(assets)?;
    let output_dir = output.unwrap_or_else(|| Path::new("."));

    if (answer_key || both) && !paper.has_marked_answers() {
        warn!("No correct options are marked; the answer key matches the paper");
    }

    let artifacts = if both {
        let (full, key) = export_bundle(&paper, &RenderOptions::default(), &store)?;
        vec![full, key]
    } else {
        vec![examdocx::export(&paper, mode(answer_key), &store)?]
    };

    println!("{}", "Output files:".green().bold());
    let count = artifacts.len();
    for (i, artifact) in artifacts.iter().enumerate() {
        let path = examdocx::export::write_artifact(artifact, output_dir)?;
        let branch = if i + 1 == count { "└─" } else { "├─" };
        println!(
            "  {} {} ({} bytes)",
            branch.dimmed(),
            path.display(),
            artifact.len()
        );
    }

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let paper = examdocx::validate_file(input)?;
    println!(
        "{} {} ({} questions, {} marks)",
        "Valid:".green().bold(),
        input.display(),
        paper.question_count(),
        paper.marks_sum()
    );
    if paper.header.total_marks > 0 && u64::from(paper.header.total_marks) != paper.marks_sum() {
        println!(
            "{} header total marks {} differ from question marks {}",
            "Note:".yellow(),
            paper.header.total_marks,
            paper.marks_sum()
        );
    }
    Ok(())
}

fn cmd_new(
    template: Option<&Path>,
    title: Option<String>,
    output: Option<&Path>,
    save_to: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut paper = match template {
        Some(path) => load_template(path)?.instantiate(),
        None => Paper::new(),
    };
    if let Some(title) = title {
        let mut header = paper.header.clone();
        header.title = title;
        paper = paper.with_header(header);
    }

    if let Some(dir) = save_to {
        let store = JsonDirStore::open(dir)?;
        paper = store.upsert_paper(&paper)?;
        println!("{} paper {}", "Saved".green(), paper.id);
    }

    match output {
        Some(path) => {
            save_json(&paper, path)?;
            println!("{} {}", "Saved to".green(), path.display());
        }
        None => println!("{}", examdocx::render::to_json(&paper, examdocx::JsonFormat::Pretty)?),
    }
    Ok(())
}

fn cmd_preview(
    input: &Path,
    assets: &Path,
    answer_key: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let paper = load_paper(input)?;
    let builder = ExamDocx::new().with_asset_dir(assets)?;
    let builder = if answer_key { builder.answer_key() } else { builder };
    let rendered = builder.render(&paper)?;
    print!("{}", rendered.to_text());
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let paper = load_paper(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&paper.summary())?);
        return Ok(());
    }

    println!("{}", "Paper Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Id".bold(), paper.id);
    let header = &paper.header;
    for (label, value) in [
        ("Institution", &header.institution),
        ("Title", &header.title),
        ("Subject", &header.subject),
        ("Date", &header.date),
        ("Duration", &header.duration),
    ] {
        if !value.is_empty() {
            println!("{}: {}", label.bold(), value);
        }
    }
    println!("{}: {}", "Created".bold(), paper.created_at);
    println!("{}: {}", "Updated".bold(), paper.updated_at);

    println!();
    println!("{}", "Questions".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Count".bold(), paper.question_count());
    for kind in examdocx::QuestionKind::ALL {
        let n = paper.questions.iter().filter(|q| q.kind() == kind).count();
        if n > 0 {
            println!("  {} {}: {}", "├─".dimmed(), kind, n);
        }
    }
    println!("{}: {}", "Marks".bold(), paper.marks_sum());
    println!(
        "{}: {}",
        "Answers marked".bold(),
        if paper.has_marked_answers() { "Yes" } else { "No" }
    );

    match paper.validate() {
        Ok(()) => println!("{}: {}", "Status".bold(), "valid".green()),
        Err(e) => println!("{}: {}", "Status".bold(), e.to_string().red()),
    }

    Ok(())
}

fn cmd_list(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonDirStore::open(data_dir)?;

    println!("{}", "Papers".cyan().bold());
    for summary in store.list_papers()? {
        let title = if summary.title.is_empty() {
            "(untitled)"
        } else {
            summary.title.as_str()
        };
        println!(
            "  {} {}  {}",
            summary.id.dimmed(),
            title,
            summary.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!("{}", "Templates".cyan().bold());
    for summary in store.list_templates()? {
        println!("  {} {}", summary.id.dimmed(), summary.name);
    }

    if !fs::metadata(data_dir.join("uploads")).map(|m| m.is_dir()).unwrap_or(false) {
        println!("{}", "No uploads directory".dimmed());
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "examdocx".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Exam paper DOCX export tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/examdocx".dimmed());
    println!("License: MIT");
}
