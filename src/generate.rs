use crate::classify::Classifier;
use crate::cli::Cli;
use crate::config;
use crate::record::{self, format_size, FileRecord};
use crate::report;
use crate::sources;
use crate::term::{ConsoleProgress, NoProgress, Progress};
use crate::walker::{CandidateFile, ScanContext, Walker};
use colored::*;
use std::error::Error;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum UsageError {
    DirectoryNotFound(String),
}

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageError::DirectoryNotFound(dir) => {
                write!(f, "directory not found: {}", dir)
            }
        }
    }
}

impl Error for UsageError {}

pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let start_path = PathBuf::from(&cli.directory);
    if !start_path.is_dir() {
        return Err(UsageError::DirectoryNotFound(cli.directory).into());
    }
    let start_path = start_path.canonicalize()?;

    let project_root = sources::find_project_root(&start_path);
    let config = config::load_config(&project_root);

    let output = cli
        .output
        .or(config.output)
        .unwrap_or_else(|| "code_summary.md".to_string());
    let output_path = PathBuf::from(&output);
    let include_metadata_table = !cli.no_metadata_table && config.metadata_table.unwrap_or(true);
    let include_hash = cli.include_hash || config.include_hash.unwrap_or(false);
    let verbose = cli.verbose || config.verbose.unwrap_or(false);
    let show_progress = !cli.no_progress && config.progress.unwrap_or(true);
    if cli.no_color || config.no_color.unwrap_or(false) {
        colored::control::set_override(false);
    }

    println!(
        "{} {}",
        "Scanning directory:".bold(),
        start_path.display()
    );
    println!("Project root: {}", project_root.display());
    if project_root.join(".gitignore").exists() {
        println!(
            "Using .gitignore from: {}",
            project_root.join(".gitignore").display()
        );
    }

    // The report in progress and this binary are excluded from the walk by
    // resolved identity, so they never end up inside the report.
    let self_path = std::env::current_exe().unwrap_or_default();
    let excluded: Vec<&Path> = [output_path.as_path(), self_path.as_path()]
        .into_iter()
        .filter(|p| !p.as_os_str().is_empty())
        .collect();
    let ctx = ScanContext::new(
        project_root.clone(),
        sources::build_root_pattern_set(&project_root),
        &excluded,
    );

    let candidates: Vec<CandidateFile> = Walker::new(&start_path, ctx).collect();
    println!("Found {} files to consider", candidates.len());

    let classifier = Classifier::new();
    let mut progress = progress_for(show_progress, "Processing");
    progress.start(candidates.len());
    let mut records: Vec<FileRecord> = Vec::new();
    for candidate in &candidates {
        if let Some(r) = record::process_file(candidate, &classifier, include_hash) {
            if verbose {
                println!(
                    "  {} ({} lines, {})",
                    r.relative_path.green(),
                    r.lines,
                    format_size(r.size)
                );
            }
            records.push(r);
        }
        progress.advance(1);
    }
    progress.finish();

    println!("Writing to {}", output_path.display());
    write_output(
        &output_path,
        &start_path,
        &records,
        include_metadata_table,
        progress_for(show_progress, "Writing"),
    )
    .map_err(|e| format!("could not write to {}: {}", output_path.display(), e))?;

    let total_lines: usize = records.iter().map(|r| r.lines).sum();
    let total_size: u64 = records.iter().map(|r| r.size).sum();
    println!(
        "\n{} Processed {} files",
        "Success!".green().bold(),
        records.len()
    );
    println!("Total lines: {}", total_lines);
    println!("Total size: {}", format_size(total_size));
    println!("Output: {}", output_path.display());

    Ok(())
}

fn progress_for(show: bool, label: &'static str) -> Box<dyn Progress> {
    if show {
        Box::new(ConsoleProgress::new(label))
    } else {
        Box::new(NoProgress)
    }
}

fn write_output(
    output_path: &Path,
    start_path: &Path,
    records: &[FileRecord],
    include_metadata_table: bool,
    mut progress: Box<dyn Progress>,
) -> std::io::Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let scan_name = start_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| start_path.display().to_string());

    let file = fs::File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    report::write_report(
        &mut writer,
        &scan_name,
        start_path,
        records,
        include_metadata_table,
        progress.as_mut(),
    )?;
    writer.flush()
}
