//! Cross-issue reference placeholders.
//!
//! References to source issues are rewritten in two layers. While issues are
//! imported, each reference becomes a placeholder token
//! `@PSTART<marker><digits>@PEND` (or `@PSTART<digits>@PEND` for links to the
//! source tracker). After every issue exists at the destination the tokens are
//! reduced to final destination references.

mod encoder;
mod resolver;

pub use encoder::ReferenceEncoder;
pub use resolver::{IdMap, PlaceholderResolver, Resolution};

/// Opening sentinel of a placeholder token.
pub const PLACEHOLDER_OPEN: &str = "@PSTART";

/// Closing sentinel of a placeholder token.
pub const PLACEHOLDER_CLOSE: &str = "@PEND";

/// Default prefix for destination issue references.
pub const DEFAULT_DESTINATION_MARKER: &str = "GH-";

/// Returns true if the text contains at least one placeholder token.
#[must_use]
pub fn contains_placeholder(text: &str) -> bool {
    text.contains(PLACEHOLDER_OPEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_reference_resolves_to_destination_reference() {
        let encoder =
            ReferenceEncoder::new("PROJ", "https://java.net/jira/browse/", "GH-").unwrap();
        let resolver = PlaceholderResolver::new("GH-", IdMap::from_iter([(42, 7)])).unwrap();

        let encoded = encoder.encode("Depends on: PROJ-42");
        assert!(contains_placeholder(&encoded));

        let resolved = resolver.resolve(&encoded);
        assert_eq!(resolved.text, "Depends on: GH-7");
        assert!(!resolved.text.contains(PLACEHOLDER_OPEN));
        assert!(!resolved.text.contains(PLACEHOLDER_CLOSE));
    }

    #[test]
    fn link_to_source_tracker_resolves_to_bare_number() {
        let encoder =
            ReferenceEncoder::new("PROJ", "https://java.net/jira/browse/", "GH-").unwrap();
        let resolver = PlaceholderResolver::new("GH-", IdMap::from_iter([(42, 7)])).unwrap();

        let encoded = encoder.encode("see https://java.net/jira/browse/PROJ-42 for details");
        let resolved = resolver.resolve(&encoded);

        assert_eq!(resolved.text, "see 7 for details");
    }
}
