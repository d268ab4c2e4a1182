use glob::MatchOptions;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One compiled ignore rule, gitignore flavor: `!` negates, a trailing `/`
/// restricts the rule to directories, a `/` anywhere else anchors the rule to
/// the scope root. Immutable once compiled.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub raw: String,
    pub negated: bool,
    pub dir_only: bool,
    pub anchored: bool,
    matcher: Option<glob::Pattern>,
}

impl Pattern {
    /// Parse a single ignore-file line. Returns None for blank lines and
    /// comments. A line whose glob fails to compile still produces a
    /// Pattern, one that never matches anything.
    pub fn parse(line: &str) -> Option<Pattern> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        // A leading backslash escapes '#' or '!' so they can start a literal.
        let (negated, body) = if let Some(rest) = trimmed.strip_prefix('\\') {
            (false, rest)
        } else if let Some(rest) = trimmed.strip_prefix('!') {
            (true, rest)
        } else {
            (false, trimmed)
        };

        let (dir_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };

        let (anchored, body) = match body.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (body.contains('/'), body),
        };

        // An un-anchored rule floats: it may match at any depth.
        let glob_text = if anchored {
            body.to_string()
        } else {
            format!("**/{}", body)
        };

        let matcher = if body.is_empty() {
            None
        } else {
            glob::Pattern::new(&glob_text).ok()
        };

        Some(Pattern {
            raw: trimmed.to_string(),
            negated,
            dir_only,
            anchored,
            matcher,
        })
    }

    fn hits(&self, path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        match &self.matcher {
            Some(m) => m.matches_with(path, MATCH_OPTIONS),
            None => false,
        }
    }
}

/// An ordered list of ignore rules over one scope. Among all rules matching a
/// path, the one declared last decides (last-match-wins); no match means the
/// path is not ignored.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn compile<I, S>(lines: I) -> PatternSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PatternSet {
            patterns: lines
                .into_iter()
                .filter_map(|l| Pattern::parse(l.as_ref()))
                .collect(),
        }
    }

    /// New set with `lines` appended after the existing rules, so they take
    /// precedence under last-match-wins. Used for nested ignore scopes.
    pub fn extended<I, S>(&self, lines: I) -> PatternSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = self.patterns.clone();
        patterns.extend(lines.into_iter().filter_map(|l| Pattern::parse(l.as_ref())));
        PatternSet { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `path` (relative to the scope root, slash-separated) is
    /// ignored. An excluded ancestor directory blocks the whole subtree;
    /// a later negation cannot resurrect anything beneath it.
    pub fn matches(&self, path: &str, is_dir: bool) -> bool {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return false;
        }

        for (i, ch) in path.char_indices() {
            if ch == '/' && self.verdict(&path[..i], true) == Some(true) {
                return true;
            }
        }

        self.verdict(path, is_dir).unwrap_or(false)
    }

    fn verdict(&self, path: &str, is_dir: bool) -> Option<bool> {
        let mut decision = None;
        for p in &self.patterns {
            if p.hits(path, is_dir) {
                decision = Some(!p.negated);
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(lines: &[&str]) -> PatternSet {
        PatternSet::compile(lines)
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let s = set(&["", "   ", "# a comment", "*.log"]);
        assert_eq!(s.len(), 1);
        assert!(s.matches("debug.log", false));
    }

    #[test]
    fn escaped_hash_is_a_literal() {
        let s = set(&["\\#notes.txt"]);
        assert!(s.matches("#notes.txt", false));
        assert!(!s.matches("notes.txt", false));
    }

    #[test]
    fn basename_pattern_floats_to_any_depth() {
        let s = set(&["*.pyc"]);
        assert!(s.matches("a.pyc", false));
        assert!(s.matches("deep/nested/b.pyc", false));
        assert!(!s.matches("a.py", false));
    }

    #[test]
    fn slashed_pattern_is_anchored_to_the_root() {
        let s = set(&["doc/frotz"]);
        assert!(s.matches("doc/frotz", false));
        assert!(!s.matches("sub/doc/frotz", false));
    }

    #[test]
    fn leading_slash_anchors_a_basename() {
        let s = set(&["/build"]);
        assert!(s.matches("build", false));
        assert!(!s.matches("sub/build", false));
    }

    #[test]
    fn dir_pattern_matches_directory_not_file() {
        let s = set(&["build/"]);
        assert!(s.matches("build", true));
        assert!(!s.matches("build", false));
        // everything beneath the matched directory is blocked
        assert!(s.matches("build/out.o", false));
        assert!(s.matches("sub/build/out.o", false));
    }

    #[test]
    fn last_match_wins() {
        let s = set(&["*.log", "!important.log"]);
        assert!(s.matches("debug.log", false));
        assert!(!s.matches("important.log", false));

        // declared the other way round, the exclusion wins again
        let s = set(&["!important.log", "*.log"]);
        assert!(s.matches("important.log", false));
    }

    #[test]
    fn negation_cannot_resurrect_under_excluded_dir() {
        let s = set(&["node_modules/", "!node_modules/keep.txt"]);
        assert!(s.matches("node_modules/keep.txt", false));
        assert!(s.matches("node_modules", true));
    }

    #[test]
    fn star_does_not_cross_separators_but_doublestar_does() {
        let s = set(&["src/*.rs"]);
        assert!(s.matches("src/main.rs", false));
        assert!(!s.matches("src/bin/extra.rs", false));

        let s = set(&["src/**/*.rs"]);
        assert!(s.matches("src/bin/extra.rs", false));
    }

    #[test]
    fn character_classes() {
        let s = set(&["file[0-9].txt"]);
        assert!(s.matches("file3.txt", false));
        assert!(!s.matches("filex.txt", false));
    }

    #[test]
    fn malformed_glob_is_a_noop() {
        let s = set(&["a**b", "*.log"]);
        assert_eq!(s.len(), 2);
        assert!(!s.matches("a**b", false));
        assert!(!s.matches("axb", false));
        assert!(s.matches("x.log", false));
    }

    #[test]
    fn extended_rules_take_precedence() {
        let base = set(&["!secret.txt", "*.tmp"]);
        let s = base.extended(["secret.txt", "!scratch.tmp"]);
        assert!(s.matches("secret.txt", false));
        assert!(!s.matches("scratch.tmp", false));
        // the base set is untouched
        assert!(!base.matches("secret.txt", false));
    }

    #[test]
    fn no_match_means_not_ignored() {
        let s = set(&["*.log"]);
        assert!(!s.matches("src/lib.rs", false));
        assert!(!s.matches("src", true));
    }

    proptest! {
        #[test]
        fn literal_pattern_matches_itself(
            path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}"
        ) {
            let s = PatternSet::compile([path.as_str()]);
            prop_assert!(s.matches(&path, false));
        }

        #[test]
        fn appended_negation_overrides(
            path in "[a-z]{1,8}\\.[a-z]{1,3}"
        ) {
            let base = PatternSet::compile([path.as_str()]);
            prop_assert!(base.matches(&path, false));
            let negated = base.extended([format!("!{}", path)]);
            prop_assert!(!negated.matches(&path, false));
        }
    }
}
