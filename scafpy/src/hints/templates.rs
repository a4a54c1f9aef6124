//! Deterministic template hints built from declaration structure: name
//! tokens, parameter names, group roles and the docstring topic. No
//! source text is ever quoted.

use crate::analyzer::{DeclKind, Declaration, StmtRole};
use crate::convert::{role_phrase, HintCategory};
use crate::utils::split_identifier;

/// Template text for one category.
pub(crate) fn template_text(category: HintCategory, decl: &Declaration) -> String {
    match category {
        HintCategory::Conceptual => conceptual(decl),
        HintCategory::Approach => approach(decl),
        HintCategory::Implementation => implementation(decl),
        HintCategory::Resource => resource(decl),
    }
}

fn subject(decl: &Declaration) -> String {
    let words = split_identifier(&decl.signature.name);
    if words.is_empty() {
        "this step".to_owned()
    } else {
        words.join(" ")
    }
}

fn conceptual(decl: &Declaration) -> String {
    let subject = subject(decl);
    match decl.docstring.as_deref().map(first_sentence) {
        Some(topic) if !topic.is_empty() => {
            format!("Before coding, restate the goal of {subject} in your own words: {topic}")
        }
        _ => match decl.kind {
            DeclKind::Class => format!(
                "Treat {subject} as one responsibility with a small public surface; decide what state it owns before writing methods."
            ),
            DeclKind::Test => format!(
                "A test for {subject} sets up a known situation, acts once, and checks one observable outcome."
            ),
            _ => format!(
                "State what {subject} must produce for a given input before thinking about code."
            ),
        },
    }
}

fn approach(decl: &Declaration) -> String {
    let subject = subject(decl);
    let phrases = role_sequence(decl);
    if phrases.is_empty() {
        return format!(
            "Break {subject} into small steps and write them as comments before filling any in."
        );
    }
    format!(
        "Work toward {subject} in stages: {}.",
        phrases.join(", then ")
    )
}

fn implementation(decl: &Declaration) -> String {
    let constructs = construct_words(decl);
    let params: Vec<&str> = decl
        .signature
        .params
        .iter()
        .filter(|p| !p.is_receiver())
        .map(|p| p.name.as_str())
        .collect();
    match (constructs.is_empty(), params.is_empty()) {
        (false, false) => format!(
            "Expect to need {}; let {} drive the control flow.",
            constructs.join(" and "),
            params.join(" and ")
        ),
        (false, true) => format!("Expect to need {}.", constructs.join(" and ")),
        (true, false) => format!(
            "Straight-line code is enough; compute directly from {}.",
            params.join(" and ")
        ),
        (true, true) => "Straight-line code is enough here; no control flow is required.".to_owned(),
    }
}

fn resource(decl: &Declaration) -> String {
    let topics = doc_topics(decl);
    format!(
        "Review the Python tutorial sections on {} at docs.python.org.",
        topics.join(" and ")
    )
}

/// Role phrases in body order, deduplicated while keeping first
/// occurrence.
fn role_sequence(decl: &Declaration) -> Vec<&'static str> {
    let mut seen = Vec::new();
    for stmt in &decl.body {
        let phrase = role_phrase(stmt.role);
        if !seen.contains(&phrase) {
            seen.push(phrase);
        }
    }
    seen
}

fn construct_words(decl: &Declaration) -> Vec<&'static str> {
    let mut words = Vec::new();
    let mut add = |w| {
        if !words.contains(&w) {
            words.push(w);
        }
    };
    for stmt in &decl.body {
        match stmt.role {
            StmtRole::Iterate => add(if stmt.loop_depth >= 2 {
                "nested loops"
            } else {
                "a loop"
            }),
            StmtRole::Branch => add("a conditional"),
            StmtRole::HandleErrors => add("a try/except block"),
            StmtRole::Accumulate => add("a running accumulator"),
            StmtRole::Validate => add("an input guard"),
            _ => {}
        }
    }
    words
}

fn doc_topics(decl: &Declaration) -> Vec<&'static str> {
    let mut topics = Vec::new();
    let mut add = |t| {
        if !topics.contains(&t) {
            topics.push(t);
        }
    };
    match decl.kind {
        DeclKind::Class => add("classes"),
        DeclKind::Test => add("unit testing"),
        _ => {}
    }
    for stmt in &decl.body {
        match stmt.role {
            StmtRole::Iterate => add("for statements"),
            StmtRole::Branch | StmtRole::Validate => add("control flow"),
            StmtRole::HandleErrors => add("errors and exceptions"),
            _ => {}
        }
    }
    if topics.is_empty() {
        topics.push("defining functions");
    }
    topics
}

/// First sentence of a docstring, trimmed; used as the conceptual topic.
pub(crate) fn first_sentence(doc: &str) -> &str {
    let trimmed = doc.trim();
    match trimmed.find(". ") {
        Some(pos) => &trimmed[..=pos],
        None => trimmed.lines().next().unwrap_or("").trim_end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_fragment;

    fn decl(source: &str) -> Declaration {
        analyze_fragment(source).unwrap().remove(0)
    }

    #[test]
    fn conceptual_uses_docstring_topic_when_present() {
        let d = decl("def norm(v):\n    \"\"\"Scale a vector to unit length. Slowly.\"\"\"\n    return v\n");
        let text = template_text(HintCategory::Conceptual, &d);
        assert!(text.contains("Scale a vector to unit length."));
        assert!(text.contains("norm"));
    }

    #[test]
    fn approach_lists_stages_in_body_order() {
        let d = decl(
            "def tally(xs):\n    total = 0\n    for x in xs:\n        total += x\n    return total\n",
        );
        let text = template_text(HintCategory::Approach, &d);
        assert!(text.contains("tally"));
        assert!(text.contains("initialize the working state, then iterate over the input, then return the result"));
    }

    #[test]
    fn implementation_names_constructs_and_params() {
        let d = decl(
            "def scan(items, probe):\n    for item in items:\n        if item == probe:\n            return True\n    return False\n",
        );
        let text = template_text(HintCategory::Implementation, &d);
        assert!(text.contains("a loop"));
        assert!(text.contains("items and probe"));
    }

    #[test]
    fn resource_always_points_somewhere() {
        let d = decl("def idle():\n    pass\n");
        let text = template_text(HintCategory::Resource, &d);
        assert!(text.contains("docs.python.org"));
        assert!(text.contains("defining functions"));
    }

    #[test]
    fn first_sentence_stops_at_the_period() {
        assert_eq!(first_sentence("Does a thing. More detail."), "Does a thing.");
        assert_eq!(first_sentence("One line only"), "One line only");
    }
}
