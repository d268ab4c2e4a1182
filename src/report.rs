use crate::record::{format_size, FileRecord};
use crate::term::{self, Progress};
use chrono::Local;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// GitHub-Flavored-Markdown anchor slug for a heading: backticks removed,
/// lowercased, punctuation dropped, whitespace and underscores collapsed
/// into hyphens.
pub fn gfm_anchor(heading: &str) -> String {
    let cleaned: String = heading
        .chars()
        .filter(|&c| c != '`')
        .flat_map(|c| c.to_lowercase())
        .filter(|&c| c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::new();
    let mut in_gap = false;
    for c in cleaned.chars() {
        if c.is_whitespace() || c == '_' {
            in_gap = true;
        } else {
            if in_gap {
                slug.push('-');
                in_gap = false;
            }
            slug.push(c);
        }
    }
    slug.trim_matches('-').to_string()
}

fn with_commas(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn by_relative_path(records: &[FileRecord]) -> Vec<&FileRecord> {
    let mut ordered: Vec<&FileRecord> = records.iter().collect();
    ordered.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    ordered
}

fn grouped_counts<'a, F>(records: &'a [FileRecord], key: F) -> Vec<(&'a str, usize, usize)>
where
    F: Fn(&'a FileRecord) -> &'a str,
{
    let mut groups: HashMap<&str, (usize, usize)> = HashMap::new();
    for record in records {
        let entry = groups.entry(key(record)).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += record.lines;
    }
    let mut out: Vec<(&str, usize, usize)> = groups
        .into_iter()
        .map(|(name, (count, lines))| (name, count, lines))
        .collect();
    // most populous first; name breaks ties so output is deterministic
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    out
}

pub fn generate_statistics(records: &[FileRecord]) -> String {
    let total_lines: usize = records.iter().map(|r| r.lines).sum();
    let total_size: u64 = records.iter().map(|r| r.size).sum();

    let mut stats = String::from("## 📊 Statistics\n\n");
    stats.push_str(&format!("- **Total Files:** {}\n", records.len()));
    stats.push_str(&format!(
        "- **Total Lines of Code:** {}\n",
        with_commas(total_lines as u64)
    ));
    stats.push_str(&format!("- **Total Size:** {}\n\n", format_size(total_size)));

    stats.push_str("### By Category\n\n");
    for (category, count, lines) in grouped_counts(records, |r| r.category.as_str()) {
        stats.push_str(&format!(
            "- **{}:** {} files, {} lines\n",
            category,
            count,
            with_commas(lines as u64)
        ));
    }

    stats.push_str("\n### By Language\n\n");
    for (language, count, lines) in grouped_counts(records, |r| r.language.as_str()) {
        stats.push_str(&format!(
            "- **{}:** {} files, {} lines\n",
            language,
            count,
            with_commas(lines as u64)
        ));
    }

    stats
}

pub fn generate_metadata_table(records: &[FileRecord]) -> String {
    let mut table = String::from("| File | Size | Lines | Type | Category | Last Modified |\n");
    table.push_str("|------|------|-------|------|----------|---------------|\n");

    for record in by_relative_path(records) {
        table.push_str(&format!(
            "| `{}` | {} | {} | {} | {} | {} |\n",
            record.relative_path,
            format_size(record.size),
            record.lines,
            record.language,
            record.category,
            record.modified.format("%Y-%m-%d %H:%M")
        ));
    }

    table
}

/// Render the whole report. Content sections follow strict lexicographic
/// order by relative path, whatever order the records arrived in. A file
/// that can no longer be read gets a warning and is skipped; its row in
/// the statistics and table stands.
pub fn write_report<W: Write>(
    out: &mut W,
    scan_name: &str,
    source_dir: &Path,
    records: &[FileRecord],
    include_metadata_table: bool,
    progress: &mut dyn Progress,
) -> io::Result<()> {
    let ordered = by_relative_path(records);

    writeln!(out, "# 📦 Code Summary: {}\n", scan_name)?;
    writeln!(
        out,
        "**Generated:** {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(out, "**Source Directory:** `{}`\n", source_dir.display())?;
    writeln!(out, "---\n")?;

    out.write_all(generate_statistics(records).as_bytes())?;
    writeln!(out, "\n---\n")?;

    if include_metadata_table {
        writeln!(out, "## 📋 File Metadata\n")?;
        out.write_all(generate_metadata_table(records).as_bytes())?;
        writeln!(out, "\n---\n")?;
    }

    writeln!(out, "## 📑 Table of Contents\n")?;
    for record in &ordered {
        let anchor = gfm_anchor(&format!("File: {}", record.relative_path));
        writeln!(out, "- [`{}`](#{})", record.relative_path, anchor)?;
    }
    writeln!(out, "\n---\n")?;

    writeln!(out, "## 📄 File Contents\n")?;
    progress.start(ordered.len());
    for record in &ordered {
        match fs::read(&record.path) {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);

                writeln!(out, "### File: `{}`\n", record.relative_path)?;
                write!(out, "**Language:** {} | ", record.language)?;
                write!(out, "**Size:** {} | ", format_size(record.size))?;
                write!(out, "**Lines:** {} | ", record.lines)?;
                writeln!(out, "**Category:** {}\n", record.category)?;

                if let Some(hash) = &record.hash {
                    writeln!(out, "**Hash (SHA-256):** `{}`\n", hash)?;
                }

                writeln!(out, "```{}", record.language)?;
                out.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    writeln!(out)?;
                }
                writeln!(out, "```\n")?;
                writeln!(out, "---\n")?;
            }
            Err(e) => {
                term::warn(&format!("could not read {}: {}", record.relative_path, e));
            }
        }
        progress.advance(1);
    }
    progress.finish();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::NoProgress;
    use chrono::TimeZone;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn record(relative: &str, language: &str, category: &str, lines: usize) -> FileRecord {
        FileRecord {
            path: PathBuf::from(relative),
            relative_path: relative.to_string(),
            language: language.to_string(),
            category: category.to_string(),
            size: 100,
            lines,
            modified: Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            hash: None,
        }
    }

    #[test]
    fn anchor_slugs_match_gfm() {
        assert_eq!(gfm_anchor("File: src/main.py"), "file-srcmainpy");
        assert_eq!(gfm_anchor("File: `a_b c.txt`"), "file-a-b-ctxt");
        assert_eq!(gfm_anchor("  spaced  "), "spaced");
    }

    #[test]
    fn comma_grouping() {
        assert_eq!(with_commas(0), "0");
        assert_eq!(with_commas(999), "999");
        assert_eq!(with_commas(1000), "1,000");
        assert_eq!(with_commas(1234567), "1,234,567");
    }

    #[test]
    fn table_rows_are_lexicographic() {
        let records = vec![
            record("z.py", "python", "source", 3),
            record("a.py", "python", "source", 1),
            record("m/x.rs", "rust", "source", 2),
        ];
        let table = generate_metadata_table(&records);
        let a = table.find("`a.py`").unwrap();
        let m = table.find("`m/x.rs`").unwrap();
        let z = table.find("`z.py`").unwrap();
        assert!(a < m && m < z);
        assert!(table.contains("2024-03-01 12:30"));
    }

    #[test]
    fn statistics_totals_and_groups() {
        let records = vec![
            record("a.py", "python", "source", 10),
            record("b.py", "python", "source", 5),
            record("c.md", "markdown", "docs", 1500),
        ];
        let stats = generate_statistics(&records);
        assert!(stats.contains("- **Total Files:** 3"));
        assert!(stats.contains("- **Total Lines of Code:** 1,515"));
        assert!(stats.contains("- **source:** 2 files, 15 lines"));
        assert!(stats.contains("- **docs:** 1 files, 1,500 lines"));
        // most populous group listed first
        let source_at = stats.find("- **source:**").unwrap();
        let docs_at = stats.find("- **docs:**").unwrap();
        assert!(source_at < docs_at);
    }

    #[test]
    fn content_sections_sorted_independent_of_input_order() {
        let tmp = TempDir::new().unwrap();
        let mut records = Vec::new();
        for name in ["zeta.py", "alpha.py"] {
            let p = tmp.path().join(name);
            std::fs::write(&p, format!("# {}\n", name)).unwrap();
            let mut r = record(name, "python", "source", 1);
            r.path = p;
            records.push(r);
        }

        let mut buf = Vec::new();
        write_report(
            &mut buf,
            "proj",
            tmp.path(),
            &records,
            true,
            &mut NoProgress,
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();

        let alpha = text.find("### File: `alpha.py`").unwrap();
        let zeta = text.find("### File: `zeta.py`").unwrap();
        assert!(alpha < zeta);
        assert!(text.contains("## 📊 Statistics"));
        assert!(text.contains("## 📋 File Metadata"));
        assert!(text.contains("```python"));
    }

    #[test]
    fn metadata_table_can_be_omitted() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("a.py");
        std::fs::write(&p, "x = 1\n").unwrap();
        let mut r = record("a.py", "python", "source", 1);
        r.path = p;

        let mut buf = Vec::new();
        write_report(&mut buf, "proj", tmp.path(), &[r], false, &mut NoProgress).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("## 📋 File Metadata"));
        assert!(text.contains("## 📑 Table of Contents"));
    }

    #[test]
    fn unreadable_content_is_skipped_not_fatal() {
        let r = record("ghost.py", "python", "source", 1);
        let mut buf = Vec::new();
        write_report(
            &mut buf,
            "proj",
            Path::new("."),
            &[r],
            true,
            &mut NoProgress,
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        // still listed in the table, but no content section
        assert!(text.contains("| `ghost.py` |"));
        assert!(!text.contains("### File: `ghost.py`"));
    }
}
