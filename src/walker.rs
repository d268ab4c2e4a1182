use crate::patterns::PatternSet;
use crate::sources;
use crate::term;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// A file that survived directory pruning and pattern exclusion, not yet
/// classified. `relative` is scan-root-relative with forward slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub relative: String,
}

/// Everything the walk carries downward: the scope root the patterns are
/// anchored to, the root rules, and the two paths excluded by identity
/// (the report being written and the running binary).
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub project_root: PathBuf,
    pub patterns: PatternSet,
    excluded_paths: Vec<PathBuf>,
}

impl ScanContext {
    pub fn new(project_root: PathBuf, patterns: PatternSet, excluded: &[&Path]) -> Self {
        ScanContext {
            project_root,
            patterns,
            excluded_paths: excluded.iter().map(|p| resolve(p)).collect(),
        }
    }

    /// Identity check by resolved path, so symlinks and relative spellings
    /// of the output file or binary are still recognized.
    fn is_excluded_identity(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }
        let resolved = resolve(path);
        self.excluded_paths.contains(&resolved)
    }
}

/// Resolve symlinks where possible; for a not-yet-created file, resolve the
/// parent and re-attach the file name.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => {
            // a bare file name has an empty parent, meaning the current dir
            let dir = if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            };
            dir.canonicalize()
                .map(|d| d.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lazy top-down walk. Each directory is listed once; subdirectories are
/// tested against the effective pattern set before any descent, so an
/// ignored subtree is never opened. A fresh `Walker` re-walks from disk.
pub struct Walker {
    ctx: ScanContext,
    start: PathBuf,
    dirs: VecDeque<PathBuf>,
    ready: VecDeque<CandidateFile>,
}

impl Walker {
    pub fn new(start: &Path, ctx: ScanContext) -> Self {
        Walker {
            ctx,
            start: start.to_path_buf(),
            dirs: VecDeque::from([start.to_path_buf()]),
            ready: VecDeque::new(),
        }
    }

    /// Project-root-relative slash path, or None when the entry escapes the
    /// root. Escapees bypass pattern matching entirely.
    fn root_relative(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.ctx.project_root)
            .ok()
            .map(to_slash)
    }

    fn visit_dir(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                term::warn(&format!("could not list {}: {}", dir.display(), e));
                return;
            }
        };

        // The effective scope for this directory: root rules plus any local
        // ignore file, appended so the local rules win on conflict.
        let local = sources::load_local_patterns(dir);
        let merged;
        let effective = if local.is_empty() {
            &self.ctx.patterns
        } else {
            merged = self.ctx.patterns.extended(&local);
            &merged
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    term::warn(&format!("could not read entry in {}: {}", dir.display(), e));
                    continue;
                }
            };
            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            if is_dir {
                // Pruning decision happens here, before any recursion.
                let pruned = self
                    .root_relative(&path)
                    .map(|rel| effective.matches(&rel, true))
                    .unwrap_or(false);
                if !pruned {
                    self.dirs.push_back(path);
                }
                continue;
            }

            if self.ctx.is_excluded_identity(&path) {
                continue;
            }

            let ignored = self
                .root_relative(&path)
                .map(|rel| effective.matches(&rel, false))
                .unwrap_or(false);
            if ignored {
                continue;
            }

            let relative = path
                .strip_prefix(&self.start)
                .map(to_slash)
                .unwrap_or_else(|_| to_slash(&path));
            self.ready.push_back(CandidateFile { path, relative });
        }
    }
}

impl Iterator for Walker {
    type Item = CandidateFile;

    fn next(&mut self) -> Option<CandidateFile> {
        loop {
            if let Some(file) = self.ready.pop_front() {
                return Some(file);
            }
            let dir = self.dirs.pop_front()?;
            self.visit_dir(&dir);
        }
    }
}
