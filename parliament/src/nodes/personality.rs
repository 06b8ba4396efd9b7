//! Personality scoring.
//!
//! When no negative signal fires, a node scores the action by how much of its
//! own positive vocabulary the text uses. Each node carries one strategy
//! behind the [`Personality`] trait instead of a branch on its name.

use std::fmt;

use axioms::signals::contains_at_word_start;

/// Score for a text with no matching vocabulary.
pub const NEUTRAL_SCORE: i32 = 2;
/// Score added per matching term.
pub const PER_TERM: i32 = 5;
/// Ceiling for a personality score.
pub const MAX_SCORE: i32 = 12;

/// Result of a personality reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Score in [NEUTRAL_SCORE, MAX_SCORE]
    pub score: i32,
    /// Vocabulary terms found in the text
    pub matched: Vec<&'static str>,
}

impl Reading {
    fn from_matches(matched: Vec<&'static str>) -> Self {
        let k = matched.len() as i32;
        Self {
            score: (NEUTRAL_SCORE + PER_TERM * k).min(MAX_SCORE),
            matched,
        }
    }
}

/// Fallback scoring strategy for a node.
pub trait Personality: Send + Sync + fmt::Debug {
    /// Read a lowercased text.
    fn read(&self, lowered: &str) -> Reading;

    /// Short kind name, part of the node table fingerprint.
    fn kind(&self) -> &'static str;

    /// Terms the personality responds to.
    fn terms(&self) -> &'static [&'static str];
}

/// Responds to axiom-aligned vocabulary, matched at word starts so that
/// "archive" also hears "archived".
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    terms: &'static [&'static str],
}

impl Vocabulary {
    pub const fn new(terms: &'static [&'static str]) -> Self {
        Self { terms }
    }
}

impl Personality for Vocabulary {
    fn read(&self, lowered: &str) -> Reading {
        Reading::from_matches(
            self.terms
                .iter()
                .copied()
                .filter(|term| contains_at_word_start(lowered, term))
                .collect(),
        )
    }

    fn kind(&self) -> &'static str {
        "vocabulary"
    }

    fn terms(&self) -> &'static [&'static str] {
        self.terms
    }
}

/// Responds to contrast markers, a text that holds two things at once.
/// Markers must stand as whole words: "both" counts, "bother" does not.
#[derive(Debug, Clone, Copy)]
pub struct Contrast {
    markers: &'static [&'static str],
}

impl Contrast {
    pub const fn new(markers: &'static [&'static str]) -> Self {
        Self { markers }
    }
}

impl Personality for Contrast {
    fn read(&self, lowered: &str) -> Reading {
        Reading::from_matches(
            self.markers
                .iter()
                .copied()
                .filter(|marker| contains_word(lowered, marker))
                .collect(),
        )
    }

    fn kind(&self) -> &'static str {
        "contrast"
    }

    fn terms(&self) -> &'static [&'static str] {
        self.markers
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + word.len()..].chars().next();
        before.map_or(true, |c| !c.is_alphanumeric()) && after.map_or(true, |c| !c.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMORY: Vocabulary = Vocabulary::new(&["archive", "preserve", "record"]);
    const CONTRAST: Contrast = Contrast::new(&["both", "yet", "however"]);

    #[test]
    fn test_neutral_when_nothing_matches() {
        let reading = MEMORY.read("ship it");
        assert_eq!(reading.score, NEUTRAL_SCORE);
        assert!(reading.matched.is_empty());
    }

    #[test]
    fn test_vocabulary_scales_and_caps() {
        assert_eq!(MEMORY.read("preserve it").score, 7);
        assert_eq!(MEMORY.read("share the archived record").score, 12);
        assert_eq!(MEMORY.read("archive, preserve and record").score, MAX_SCORE);
    }

    #[test]
    fn test_vocabulary_needs_word_start() {
        assert!(MEMORY.read("prerecorded").matched.is_empty());
    }

    #[test]
    fn test_contrast_needs_whole_word() {
        assert!(CONTRAST.read("don't bother").matched.is_empty());
        assert_eq!(CONTRAST.read("both fast and fair, yet careful").matched, vec!["both", "yet"]);
    }
}
