//! Rewrites source issue references into placeholder tokens.

use super::{PLACEHOLDER_CLOSE, PLACEHOLDER_OPEN};
use regex::Regex;
use tracing::trace;

/// A single rewrite: every match of `pattern` is replaced by `replacement`.
#[derive(Debug, Clone)]
struct RewriteRule {
    pattern: Regex,
    replacement: String,
}

/// Rewrites references to source issues into placeholder tokens.
///
/// Rules run in a fixed order and all of them apply, each one seeing the
/// output of the previous one. Text matching no rule is returned unchanged.
#[derive(Debug, Clone)]
pub struct ReferenceEncoder {
    rules: Vec<RewriteRule>,
}

impl ReferenceEncoder {
    /// Builds the encoder for one source project.
    ///
    /// # Arguments
    ///
    /// * `project` - Source project key, e.g. `PROJ`
    /// * `browse_url` - URL prefix of issue pages on the source tracker
    /// * `marker` - Prefix of destination issue references, e.g. `GH-`
    ///
    /// # Errors
    ///
    /// Returns an error if a rule pattern fails to compile.
    pub fn new(project: &str, browse_url: &str, marker: &str) -> Result<Self, regex::Error> {
        let project = regex::escape(project);
        let marker = marker.replace('$', "$$");
        let raw = format!("{PLACEHOLDER_OPEN}${{1}}{PLACEHOLDER_CLOSE}");
        let marked = format!("{PLACEHOLDER_OPEN}{marker}${{1}}{PLACEHOLDER_CLOSE}");

        let rules = vec![
            RewriteRule {
                pattern: Regex::new(&format!(r"{}{project}-(\d+)", regex::escape(browse_url)))?,
                replacement: raw,
            },
            RewriteRule {
                pattern: Regex::new(&format!(r"{project}-(\d+)"))?,
                replacement: marked.clone(),
            },
            RewriteRule {
                pattern: Regex::new(r"Issue (\d+)")?,
                replacement: marked,
            },
        ];

        Ok(Self { rules })
    }

    /// Rewrites every recognised reference in `text`.
    #[must_use]
    pub fn encode(&self, text: &str) -> String {
        let mut result = text.to_string();
        for rule in &self.rules {
            if rule.pattern.is_match(&result) {
                trace!(pattern = %rule.pattern, "Rewriting references");
                result = rule
                    .pattern
                    .replace_all(&result, rule.replacement.as_str())
                    .into_owned();
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> ReferenceEncoder {
        ReferenceEncoder::new("PROJ", "https://java.net/jira/browse/", "GH-").unwrap()
    }

    #[test]
    fn encodes_key_reference_with_marker() {
        assert_eq!(encoder().encode("PROJ-42"), "@PSTARTGH-42@PEND");
    }

    #[test]
    fn encodes_issue_word_reference_with_marker() {
        assert_eq!(
            encoder().encode("fixed by Issue 12"),
            "fixed by @PSTARTGH-12@PEND"
        );
    }

    #[test]
    fn encodes_source_link_as_bare_number() {
        assert_eq!(
            encoder().encode("https://java.net/jira/browse/PROJ-42"),
            "@PSTART42@PEND"
        );
    }

    #[test]
    fn applies_all_rules_cumulatively() {
        let text = "https://java.net/jira/browse/PROJ-1 and PROJ-2 and Issue 3";
        assert_eq!(
            encoder().encode(text),
            "@PSTART1@PEND and @PSTARTGH-2@PEND and @PSTARTGH-3@PEND"
        );
    }

    #[test]
    fn unmatched_text_is_unchanged() {
        let text = "Nothing to see: OTHER-4, issue 5, PROJ-";
        assert_eq!(encoder().encode(text), text);
    }

    #[test]
    fn project_key_is_matched_literally() {
        let encoder = ReferenceEncoder::new("A.B", "https://x/", "GH-").unwrap();
        assert_eq!(encoder.encode("AxB-1"), "AxB-1");
        assert_eq!(encoder.encode("A.B-1"), "@PSTARTGH-1@PEND");
    }
}
