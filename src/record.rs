use crate::classify::Classifier;
use crate::term;
use crate::walker::CandidateFile;
use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Classified, metadata-enriched file ready for rendering. Display order is
/// lexicographic by `relative_path`, imposed by the report builder.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub relative_path: String,
    pub language: String,
    pub category: String,
    pub size: u64,
    pub lines: usize,
    pub modified: DateTime<Local>,
    pub hash: Option<String>,
}

/// Build a record for one accepted candidate. Returns None when the file has
/// no recognized language, or when it cannot be stat'd (with a warning);
/// either way the scan continues.
pub fn process_file(
    candidate: &CandidateFile,
    classifier: &Classifier,
    include_hash: bool,
) -> Option<FileRecord> {
    let language = classifier.language_of(&candidate.path)?;

    let meta = match std::fs::metadata(&candidate.path) {
        Ok(m) => m,
        Err(e) => {
            term::warn(&format!(
                "error processing {}: {}",
                candidate.path.display(),
                e
            ));
            return None;
        }
    };

    let modified = meta
        .modified()
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now());

    Some(FileRecord {
        path: candidate.path.clone(),
        relative_path: candidate.relative.clone(),
        language: language.to_string(),
        category: classifier.category_of(&candidate.path).to_string(),
        size: meta.len(),
        lines: count_lines(&candidate.path),
        modified,
        hash: if include_hash {
            file_hash(&candidate.path)
        } else {
            None
        },
    })
}

/// Line count in the git sense: newline count, plus one for an unterminated
/// final line. Unreadable files count as zero.
pub fn count_lines(path: &Path) -> usize {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return 0,
    };
    let mut reader = BufReader::new(file);
    let mut lines = 0;
    let mut last = b'\n';
    loop {
        let buf = match reader.fill_buf() {
            Ok(b) => b,
            Err(_) => return lines,
        };
        if buf.is_empty() {
            break;
        }
        lines += buf.iter().filter(|&&b| b == b'\n').count();
        last = buf[buf.len() - 1];
        let consumed = buf.len();
        reader.consume(consumed);
    }
    if last != b'\n' {
        lines += 1;
    }
    lines
}

/// SHA-256 of the file contents, streamed in 4 KiB chunks; None on any
/// read failure.
pub fn file_hash(path: &Path) -> Option<String> {
    let mut file = File::open(path).ok()?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = file.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Some(format!("{:x}", hasher.finalize()))
}

pub fn format_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}
