//! # CLI Module
//!
//! Command-line interface for the toolbox.
//!
//! The terminal plays the part of the UI: it owns the event loop, binds a
//! progress bar as the task's progress and status sinks, and shows task
//! failures on stderr.
//!
//! ## Usage
//! ```bash
//! # Sort a folder into Images/, Documents/, ...
//! toolbox organize ~/Downloads
//!
//! # Copy files as 001.jpg, 002.jpg, ...
//! toolbox rename a.jpg b.jpg --dest ~/out --format three-digits
//!
//! # Split a CSV into parts of 10,000 rows
//! toolbox split-csv big.csv --rows 10000 --dest ~/parts
//!
//! # Checksums as JSON
//! toolbox checksum image.iso --output json
//!
//! # Group a pasted list into chunks of 300
//! pbpaste | toolbox split-list --size 300
//!
//! # Find repeated lines, writing lista_unicos.txt / lista_duplicados.txt
//! toolbox dedupe-list names.txt --dest ~/out
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use toolbox::core::event_loop::EventLoop;
use toolbox::core::preferences::SessionPreferences;
use toolbox::core::runner::{Completion, ConsoleNotifier, Sinks, TaskRunner};
use toolbox::core::tools::{
    checksum, copy_renamed, dedupe_list, organize_folder, render_groups, split_csv, split_list,
    ChecksumRequest, NumberFormat, OrganizeMode, OrganizeRequest, RenameRequest,
    SplitCsvRequest, ToolController,
};
use toolbox::error::{FailureKind, Result, TaskFailure, ToolError};
use toolbox::events::ProgressReporter;

/// Toolbox - everyday file utilities that never freeze
#[derive(Parser, Debug)]
#[command(name = "toolbox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Preferences file (defaults to ~/.toolbox_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How often progress is polled, in milliseconds
    #[arg(long, global = true, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    poll_ms: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move the files of a folder into per-type subfolders
    Organize {
        /// Folder to organize
        folder: PathBuf,

        /// How to group files
        #[arg(short, long, default_value = "category")]
        mode: Mode,
    },

    /// Copy files into a folder under sequential numeric names
    Rename {
        /// Files to copy, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Destination folder (defaults to the last one used)
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// First number of the sequence
        #[arg(short, long, default_value = "1")]
        start: u64,

        /// Zero padding of the numbers
        #[arg(short, long, default_value = "plain")]
        format: Padding,
    },

    /// Split a CSV file into parts that repeat the header
    SplitCsv {
        /// CSV file to split
        file: PathBuf,

        /// Maximum data rows per part
        #[arg(short, long, default_value = "10000")]
        rows: usize,

        /// Destination folder (defaults to the last one used)
        #[arg(short, long)]
        dest: Option<PathBuf>,
    },

    /// Compute MD5 and SHA-256 checksums of a file
    Checksum {
        /// File to hash
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Split a list (one item per line) into groups
    SplitList {
        /// File holding the list; reads stdin when omitted
        input: Option<PathBuf>,

        /// Items per group
        #[arg(short, long, default_value = "300")]
        size: usize,

        /// Write the groups to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a list (one item per line) into unique and repeated items
    DedupeList {
        /// Text file holding the list
        input: PathBuf,

        /// Folder for the result files (defaults to the last one used)
        #[arg(short, long)]
        dest: Option<PathBuf>,
    },

    /// Show or change saved preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    /// Print the theme and remembered folders
    Show,
    /// Switch between the light and dark theme
    ToggleTheme,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Images, Videos, Documents, ...
    Category,
    /// One folder per extension
    Extension,
}

impl From<Mode> for OrganizeMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Category => OrganizeMode::Category,
            Mode::Extension => OrganizeMode::Extension,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Padding {
    /// 1, 2, 3
    Plain,
    /// 01, 02, 03
    TwoDigits,
    /// 001, 002, 003
    ThreeDigits,
}

impl From<Padding> for NumberFormat {
    fn from(padding: Padding) -> Self {
        match padding {
            Padding::Plain => NumberFormat::Plain,
            Padding::TwoDigits => NumberFormat::TwoDigits,
            Padding::ThreeDigits => NumberFormat::ThreeDigits,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// How the progress bar renders its position
#[derive(Clone, Copy)]
enum BarUnits {
    Items,
    Bytes,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let poll = Duration::from_millis(cli.poll_ms);

    let prefs_path = cli.config.clone().or_else(SessionPreferences::default_path);
    let mut prefs = match &prefs_path {
        Some(path) => SessionPreferences::load(path)?,
        None => SessionPreferences::new(),
    };

    let outcome = match cli.command {
        Commands::Organize { folder, mode } => run_organize(&mut prefs, poll, folder, mode.into()),
        Commands::Rename {
            files,
            dest,
            start,
            format,
        } => run_rename(&mut prefs, poll, files, dest, start, format.into()),
        Commands::SplitCsv { file, rows, dest } => run_split_csv(&mut prefs, poll, file, rows, dest),
        Commands::Checksum { file, output } => run_checksum(&mut prefs, poll, file, output),
        Commands::SplitList {
            input,
            size,
            output,
        } => run_split_list(&mut prefs, input, size, output),
        Commands::DedupeList { input, dest } => run_dedupe_list(&mut prefs, input, dest),
        Commands::Prefs { action } => {
            run_prefs(&mut prefs, action);
            Ok(())
        }
    };

    // Remembered folders are kept even when the task itself failed.
    if let Some(path) = prefs_path {
        prefs.save(&path)?;
    }

    outcome
}

fn run_organize(
    prefs: &mut SessionPreferences,
    poll: Duration,
    folder: PathBuf,
    mode: OrganizeMode,
) -> Result<()> {
    let request = OrganizeRequest::new(folder, mode)?;
    prefs.remember("organizer_open", request.folder());

    run_in_background(
        "Organizer",
        poll,
        BarUnits::Items,
        move |reporter| organize_folder(reporter, &request).map_err(TaskFailure::from),
        |summary| {
            let folders: Vec<String> = summary
                .by_folder
                .iter()
                .map(|(name, count)| format!("{} ({})", name, count))
                .collect();
            format!(
                "{} file(s) organized into {}",
                summary.files_moved,
                if folders.is_empty() {
                    "no folders".to_string()
                } else {
                    folders.join(", ")
                }
            )
        },
    )
    .map(|_| ())
}

fn run_rename(
    prefs: &mut SessionPreferences,
    poll: Duration,
    files: Vec<PathBuf>,
    dest: Option<PathBuf>,
    start: u64,
    format: NumberFormat,
) -> Result<()> {
    let dest = dest.unwrap_or_else(|| prefs.initial_dir("renamer_dest"));
    let request = RenameRequest::new(files, dest, start, format)?;
    prefs.remember("renamer_open", &request.files()[0]);
    prefs.remember("renamer_dest", request.destination());

    run_in_background(
        "Renamer",
        poll,
        BarUnits::Items,
        move |reporter| copy_renamed(reporter, &request).map_err(TaskFailure::from),
        |copied| format!("{} file(s) copied and renamed", copied),
    )
    .map(|_| ())
}

fn run_split_csv(
    prefs: &mut SessionPreferences,
    poll: Duration,
    file: PathBuf,
    rows: usize,
    dest: Option<PathBuf>,
) -> Result<()> {
    let dest = dest.unwrap_or_else(|| prefs.initial_dir("divisor_save"));
    let request = SplitCsvRequest::new(file, rows, &dest)?;
    prefs.remember("divisor_open", request.file());
    prefs.remember("divisor_save", &dest);

    run_in_background(
        "Splitter",
        poll,
        BarUnits::Items,
        move |reporter| split_csv(reporter, &request).map_err(TaskFailure::from),
        |parts| format!("File split into {} part(s)", parts),
    )
    .map(|_| ())
}

fn run_checksum(
    prefs: &mut SessionPreferences,
    poll: Duration,
    file: PathBuf,
    output: OutputFormat,
) -> Result<()> {
    let request = ChecksumRequest::new(file)?;
    prefs.remember("hash_open", request.file());

    let report = run_in_background(
        "Checksum",
        poll,
        BarUnits::Bytes,
        move |reporter| checksum(reporter, &request).map_err(TaskFailure::from),
        |report| format!("{} byte(s) hashed", report.bytes),
    )?;

    match output {
        OutputFormat::Pretty => {
            println!("{}  {}", style("MD5").bold(), report.md5);
            println!("{}  {}", style("SHA-256").bold(), report.sha256);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        }
    }
    Ok(())
}

fn run_split_list(
    prefs: &mut SessionPreferences,
    input: Option<PathBuf>,
    size: usize,
    output: Option<PathBuf>,
) -> Result<()> {
    let text = match &input {
        Some(path) => std::fs::read_to_string(path).map_err(|source| ToolError::Read {
            path: path.clone(),
            source,
        })?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| ToolError::Read {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            text
        }
    };

    let groups = split_list(&text, size)?;
    let rendered = render_groups(&groups);

    match output {
        Some(path) => {
            write_text(&path, rendered.trim_end())?;
            prefs.remember("list_save", &path);
            Term::stderr()
                .write_line(&format!(
                    "{} {} group(s) written to {}",
                    style("✓").green().bold(),
                    groups.len(),
                    path.display()
                ))
                .ok();
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn run_dedupe_list(
    prefs: &mut SessionPreferences,
    input: PathBuf,
    dest: Option<PathBuf>,
) -> Result<()> {
    let text = std::fs::read_to_string(&input).map_err(|source| ToolError::Read {
        path: input.clone(),
        source,
    })?;
    prefs.remember("duplicatas_open", &input);

    let report = dedupe_list(&text)?;
    let dest = dest.unwrap_or_else(|| prefs.initial_dir("duplicatas_save"));
    let (unique, duplicates) = report.write_to(&dest)?;
    prefs.remember("duplicatas_save", &dest);

    Term::stderr()
        .write_line(&format!(
            "{} {} unique and {} duplicated item(s) found\n  {}\n  {}",
            style("✓").green().bold(),
            report.unique.len(),
            report.duplicates.len(),
            unique.display(),
            duplicates.display()
        ))
        .ok();
    Ok(())
}

fn run_prefs(prefs: &mut SessionPreferences, action: PrefsAction) {
    let term = Term::stdout();
    match action {
        PrefsAction::Show => {
            term.write_line(&format!("Theme: {}", style(prefs.theme()).cyan()))
                .ok();
            for (key, path) in prefs.last_paths() {
                term.write_line(&format!("  {:<16} {}", key, path.display()))
                    .ok();
            }
        }
        PrefsAction::ToggleTheme => {
            let theme = prefs.toggle_theme();
            term.write_line(&format!("Theme switched to {}", style(theme).cyan()))
                .ok();
        }
    }
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|source| ToolError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Run one tool's work on a worker thread while the terminal shows
/// progress, then print its summary and hand back the result.
fn run_in_background<T, W, S>(
    tool: &'static str,
    poll: Duration,
    units: BarUnits,
    work: W,
    summarize: S,
) -> Result<T>
where
    T: Send + 'static,
    W: FnOnce(&ProgressReporter) -> std::result::Result<T, TaskFailure> + Send + 'static,
    S: FnOnce(&T) -> String + 'static,
{
    let term = Term::stderr();
    let event_loop = EventLoop::new();
    let runner = TaskRunner::builder(event_loop.clone())
        .poll_interval(poll)
        .notifier(ConsoleNotifier::new())
        .error_title(tool)
        .build();

    let bar = progress_bar(units);
    let controller = ToolController::shared(tool);
    let outcome = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&outcome);
    ToolController::launch(
        &controller,
        &runner,
        work,
        Sinks::new().progress(bar.clone()).status(bar.clone()),
        summarize,
        move |completion| *slot.borrow_mut() = Some(completion),
    )?;

    event_loop.run_until_idle();
    bar.finish_and_clear();

    let completion = outcome.borrow_mut().take().unwrap_or_else(|| {
        Completion::Failure(TaskFailure::new(
            FailureKind::Disconnected,
            "The task stopped without reporting a result",
        ))
    });
    let value = completion.into_result()?;
    if let Some(summary) = controller.borrow().last_summary() {
        term.write_line(&format!("{} {}", style("✓").green().bold(), summary))
            .ok();
    }
    Ok(value)
}

fn progress_bar(units: BarUnits) -> ProgressBar {
    let template = match units {
        BarUnits::Items => "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        BarUnits::Bytes => "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
    };
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}
