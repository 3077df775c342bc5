// src/utils/text.rs
//
// Text cleanup helpers shared by corpus assembly and the final-document
// post-processing step.

use once_cell::sync::Lazy;
use regex::Regex;

static EXCESS_NEWLINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Failed to compile EXCESS_NEWLINES_RE"));

// Matches a citation tag plus any whitespace that precedes it, so removal
// does not leave dangling spaces before punctuation.
static CITATION_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[SOURCE:.*?\]").expect("Failed to compile CITATION_TAG_RE"));

static CITATION_CONTENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[SOURCE:\s*(.*?)\]").expect("Failed to compile CITATION_CONTENT_RE"));

// Numeric ordering prefixes ("19_") and the double extensions produced by
// preprocessing ("Appendix D.pdf.txt") inside citation tags.
static CITATION_NAME_NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+_|\.pdf\.txt$|\.docx\.txt$").expect("Failed to compile CITATION_NAME_NOISE_RE")
});

/// Collapses runs of three or more newlines and trims every line.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let collapsed = EXCESS_NEWLINES_RE.replace_all(text, "\n\n");
    collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes every `[SOURCE: ...]` citation tag, producing the clean rendition
/// of a generated document for end users.
pub fn strip_citation_tags(content: &str) -> String {
    CITATION_TAG_RE.replace_all(content, "").into_owned()
}

/// Keeps citation tags but normalizes the file names inside them: numeric
/// ordering prefixes and preprocessing extensions are stripped so the tags
/// read as logical document names.
pub fn normalize_citation_tags(content: &str) -> String {
    CITATION_CONTENT_RE
        .replace_all(content, |caps: &regex::Captures| {
            let names = caps[1]
                .split(',')
                .map(|name| CITATION_NAME_NOISE_RE.replace_all(name.trim(), "").into_owned())
                .collect::<Vec<_>>();
            format!("[SOURCE: {}]", names.join(", "))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_blank_runs() {
        let cleaned = clean_text("a\n\n\n\nb\n  indented  \nc");
        assert_eq!(cleaned, "a\n\nb\nindented\nc");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_strip_citation_tags() {
        let cited = "**Name:** Sam Doe [SOURCE: 03_Review.pdf.txt]\nLikes books. [SOURCE: a.txt, b.txt]";
        let clean = strip_citation_tags(cited);
        assert_eq!(clean, "**Name:** Sam Doe\nLikes books.");
    }

    #[test]
    fn test_normalize_citation_tags() {
        let cited = "Fact. [SOURCE: 19_Appendix D.pdf.txt, 20_Appendix E.pdf.txt]";
        let normalized = normalize_citation_tags(cited);
        assert_eq!(normalized, "Fact. [SOURCE: Appendix D, Appendix E]");
    }

    #[test]
    fn test_normalize_leaves_plain_names_alone() {
        let cited = "Fact. [SOURCE: Annual Review]";
        assert_eq!(normalize_citation_tags(cited), "Fact. [SOURCE: Annual Review]");
    }
}
