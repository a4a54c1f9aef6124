use std::sync::OnceLock;

/// Returns folders excluded from document scanning by default.
pub fn get_default_exclude_folders() -> &'static [&'static str] {
    static FOLDERS: OnceLock<Vec<&'static str>> = OnceLock::new();
    FOLDERS.get_or_init(|| {
        vec![
            ".git",
            ".venv",
            "venv",
            "node_modules",
            "__pycache__",
            "target",
            "_build",
            "site",
            ".tox",
        ]
    })
}

/// Returns stopwords ignored when matching hint terms against prose context.
///
/// These carry no topical content, so sharing only them with the context
/// still counts as a "generic" hint.
pub fn get_stopwords() -> &'static [&'static str] {
    static WORDS: OnceLock<Vec<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| {
        vec![
            "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "how", "in", "into",
            "is", "it", "its", "of", "on", "or", "that", "the", "then", "this", "to", "use",
            "using", "when", "which", "will", "with", "you", "your",
        ]
    })
}

/// Returns keyword cues mapped to tier bands for heuristic tier detection.
///
/// Matched case-insensitively against the prose preceding a fragment;
/// explicit `<!-- tier: N -->` markers always win over cues.
pub fn get_tier_keyword_cues() -> &'static [(&'static str, u8)] {
    static CUES: OnceLock<Vec<(&'static str, u8)>> = OnceLock::new();
    CUES.get_or_init(|| {
        vec![
            ("beginner", 1),
            ("first steps", 1),
            ("getting started", 1),
            ("introduction", 1),
            ("warm-up", 1),
            ("intermediate", 2),
            ("practice", 2),
            ("advanced", 3),
            ("challenge", 3),
            ("expert", 3),
        ]
    })
}
