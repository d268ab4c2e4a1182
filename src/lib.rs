pub mod classify;
pub mod cli;
pub mod config;
pub mod generate;
pub mod patterns;
pub mod record;
pub mod report;
pub mod sources;
pub mod term;
pub mod walker;

pub use classify::{probe_text, Classifier, TextProbe};
pub use patterns::{Pattern, PatternSet};
pub use record::FileRecord;
pub use sources::{build_root_pattern_set, find_project_root, load_local_patterns};
pub use term::{ConsoleProgress, NoProgress, Progress};
pub use walker::{CandidateFile, ScanContext, Walker};

use std::path::Path;

/// Walk `start_path` with the full pattern stack (built-ins, root ignore
/// files, nested ignore files) and return the accepted candidates. `excluded`
/// paths are skipped by resolved identity regardless of patterns.
pub fn collect_candidates(start_path: &Path, excluded: &[&Path]) -> Vec<CandidateFile> {
    let project_root = find_project_root(start_path);
    let patterns = build_root_pattern_set(&project_root);
    let ctx = ScanContext::new(project_root, patterns, excluded);
    Walker::new(start_path, ctx).collect()
}
