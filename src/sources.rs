use crate::patterns::PatternSet;
use crate::term;
use std::fs;
use std::path::{Path, PathBuf};

/// Rules applied before any project ignore file is consulted. Directory
/// rules carry a trailing slash so a file that merely shares the name
/// (e.g. a script called `build`) is left alone.
pub const BUILTIN_IGNORES: &[&str] = &[
    // version control metadata
    ".git/",
    ".svn/",
    ".hg/",
    ".bzr/",
    // dependency caches
    "node_modules/",
    "bower_components/",
    "jspm_packages/",
    "vendor/",
    "vendors/",
    // build outputs
    ".next/",
    ".nuxt/",
    ".output/",
    "out/",
    "dist/",
    "build/",
    "target/",
    "_site/",
    ".cache/",
    ".parcel-cache/",
    ".swc/",
    ".turbo/",
    ".vercel/",
    // python
    "__pycache__/",
    "*.pyc",
    "*.pyo",
    "*.pyd",
    ".Python",
    ".venv/",
    "venv/",
    "env/",
    "ENV/",
    "virtualenv/",
    ".pytest_cache/",
    ".mypy_cache/",
    ".ruff_cache/",
    ".hypothesis/",
    "*.egg-info/",
    ".tox/",
    ".coverage",
    "htmlcov/",
    ".eggs/",
    "*.egg",
    // jvm
    "*.class",
    "*.jar",
    "*.war",
    "*.ear",
    "hs_err_pid*",
    // go
    "bin/",
    "pkg/",
    // ruby
    ".bundle/",
    // editors and IDEs
    ".idea/",
    ".vscode/",
    "*.swp",
    "*.swo",
    "*~",
    ".project",
    ".classpath",
    ".settings/",
    "*.sublime-workspace",
    "*.sublime-project",
    // OS cruft
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    // logs and databases
    "*.log",
    "*.sqlite",
    "*.sqlite3",
    "*.db",
    "npm-debug.log*",
    "yarn-debug.log*",
    "yarn-error.log*",
    // local env and lock files
    ".env.local",
    ".env.*.local",
    "*.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "composer.lock",
    "Gemfile.lock",
    "poetry.lock",
    // generated site assets
    "public/",
    "static/",
    "assets/",
    "media/",
    "uploads/",
];

/// Root scope rules: built-ins first, then `<root>/.gitignore`, then
/// `<root>/.git/info/exclude`. Later sources win under last-match-wins.
pub fn build_root_pattern_set(project_root: &Path) -> PatternSet {
    let mut lines: Vec<String> = BUILTIN_IGNORES.iter().map(|s| s.to_string()).collect();
    lines.extend(read_pattern_source(&project_root.join(".gitignore")));
    lines.extend(read_pattern_source(
        &project_root.join(".git").join("info").join("exclude"),
    ));
    PatternSet::compile(&lines)
}

/// Raw pattern lines from `<directory>/.gitignore`, empty when absent.
pub fn load_local_patterns(directory: &Path) -> Vec<String> {
    read_pattern_source(&directory.join(".gitignore"))
}

fn read_pattern_source(path: &Path) -> Vec<String> {
    if !path.is_file() {
        return Vec::new();
    }
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes)
            .lines()
            .map(String::from)
            .collect(),
        Err(e) => {
            term::warn(&format!("could not read {}: {}", path.display(), e));
            Vec::new()
        }
    }
}

/// Nearest ancestor of `start_dir` containing a `.git` directory. Falls back
/// to `start_dir` itself, with a warning, when no repository is found.
pub fn find_project_root(start_dir: &Path) -> PathBuf {
    let start = start_dir
        .canonicalize()
        .unwrap_or_else(|_| start_dir.to_path_buf());

    let mut current = start.clone();
    loop {
        if current.join(".git").is_dir() {
            return current;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                term::warn(".git directory not found; using starting directory as project root");
                return start;
            }
        }
    }
}
