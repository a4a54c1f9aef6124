mod limits;
mod regexes;
mod sets;

pub use limits::{
    CHECK_WEIGHT_COVERAGE, CHECK_WEIGHT_HINT_QUALITY, CHECK_WEIGHT_LEAK, CHECK_WEIGHT_TIER,
    CONFIG_FILENAME, DEFAULT_COLLABORATOR_TIMEOUT_MS, DEFAULT_MAX_IMPLEMENTATION_LINES,
    DEFAULT_MIN_ANNOTATION_COVERAGE, DEFAULT_MIN_QUALITY_SCORE, MAX_NESTING_DEPTH,
    PYPROJECT_FILENAME, SCAFFOLD_FILE_SUFFIX, TOKENS_PER_STATEMENT,
};
pub use regexes::{
    get_assert_method_re, get_term_re, get_test_class_re, get_test_name_re, get_tier_marker_re,
};
pub use sets::{get_default_exclude_folders, get_stopwords, get_tier_keyword_cues};

pub use get_assert_method_re as ASSERT_METHOD_RE;
pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;
pub use get_stopwords as STOPWORDS;
pub use get_term_re as TERM_RE;
pub use get_test_class_re as TEST_CLASS_RE;
pub use get_test_name_re as TEST_NAME_RE;
pub use get_tier_keyword_cues as TIER_KEYWORD_CUES;
pub use get_tier_marker_re as TIER_MARKER_RE;
