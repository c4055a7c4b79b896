//! Reduces placeholder tokens to final destination references.

use super::{PLACEHOLDER_CLOSE, PLACEHOLDER_OPEN};
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Maps source issue numbers to destination issue numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    numbers: HashMap<u64, u64>,
}

impl IdMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that source issue `source` became destination issue `destination`.
    pub fn insert(&mut self, source: u64, destination: u64) {
        self.numbers.insert(source, destination);
    }

    /// Looks up the destination number of a source issue.
    #[must_use]
    pub fn get(&self, source: u64) -> Option<u64> {
        self.numbers.get(&source).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

impl FromIterator<(u64, u64)> for IdMap {
    fn from_iter<T: IntoIterator<Item = (u64, u64)>>(iter: T) -> Self {
        Self {
            numbers: iter.into_iter().collect(),
        }
    }
}

/// Outcome of resolving one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Text with every placeholder reduced.
    pub text: String,
    /// Number of placeholders replaced.
    pub replaced: usize,
    /// Placeholders whose source number had no known destination number.
    ///
    /// These keep the source number, which matches the destination number
    /// when issues were imported into an empty repository in order.
    pub unmapped: usize,
}

/// Substitutes final destination references for placeholder tokens.
#[derive(Debug, Clone)]
pub struct PlaceholderResolver {
    marker: String,
    marked: Regex,
    bare: Regex,
    ids: IdMap,
}

impl PlaceholderResolver {
    /// Builds a resolver for tokens carrying `marker`.
    ///
    /// # Errors
    ///
    /// Returns an error if a token pattern fails to compile.
    pub fn new(marker: &str, ids: IdMap) -> Result<Self, regex::Error> {
        let open = regex::escape(PLACEHOLDER_OPEN);
        let close = regex::escape(PLACEHOLDER_CLOSE);
        Ok(Self {
            marker: marker.to_string(),
            marked: Regex::new(&format!(r"{open}{}(\d+){close}", regex::escape(marker)))?,
            bare: Regex::new(&format!(r"{open}(\d+){close}"))?,
            ids,
        })
    }

    /// Returns the id map the resolver substitutes from.
    #[must_use]
    pub fn ids(&self) -> &IdMap {
        &self.ids
    }

    /// Reduces all placeholder tokens in `text`.
    ///
    /// Marked tokens become `<marker><number>`, then bare tokens become
    /// `<number>`.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Resolution {
        let mut replaced = 0;
        let mut unmapped = 0;

        let mut substitute = |caps: &Captures<'_>, prefix: &str| -> String {
            replaced += 1;
            let digits = &caps[1];
            match digits.parse::<u64>().ok().and_then(|n| self.ids.get(n)) {
                Some(number) => format!("{prefix}{number}"),
                None => {
                    unmapped += 1;
                    format!("{prefix}{digits}")
                }
            }
        };

        let text = self
            .marked
            .replace_all(text, |caps: &Captures<'_>| substitute(caps, &self.marker))
            .into_owned();
        let text = self
            .bare
            .replace_all(&text, |caps: &Captures<'_>| substitute(caps, ""))
            .into_owned();

        Resolution {
            text,
            replaced,
            unmapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PlaceholderResolver {
        PlaceholderResolver::new("GH-", IdMap::from_iter([(42, 7), (1, 100)])).unwrap()
    }

    #[test]
    fn resolves_marked_and_bare_tokens() {
        let resolved = resolver().resolve("Blocks: @PSTARTGH-42@PEND, see @PSTART1@PEND");

        assert_eq!(resolved.text, "Blocks: GH-7, see 100");
        assert_eq!(resolved.replaced, 2);
        assert_eq!(resolved.unmapped, 0);
    }

    #[test]
    fn unmapped_numbers_keep_source_number() {
        let resolved = resolver().resolve("Duplicates: @PSTARTGH-5@PEND");

        assert_eq!(resolved.text, "Duplicates: GH-5");
        assert_eq!(resolved.unmapped, 1);
    }

    #[test]
    fn text_without_tokens_is_unchanged() {
        let resolved = resolver().resolve("plain GH-42 text");

        assert_eq!(resolved.text, "plain GH-42 text");
        assert_eq!(resolved.replaced, 0);
    }

    #[test]
    fn custom_marker_is_respected() {
        let resolver = PlaceholderResolver::new("#", IdMap::from_iter([(3, 9)])).unwrap();
        assert_eq!(resolver.resolve("@PSTART#3@PEND").text, "#9");
    }
}
