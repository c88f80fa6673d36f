use crate::catalog::Catalog;
use crate::tokenizer::split_words;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};
use serde::Serialize;
use std::cmp::Ordering;

/// How a layer relates to a free-text term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerMatch {
    pub name: String,
    pub exact: bool,
    /// Term words found among the layer's aliases.
    pub alias_hits: usize,
    /// Best nucleo score against the name or any alias.
    pub fuzzy_score: u32,
}

impl LayerMatch {
    fn relevance(&self, other: &Self) -> Ordering {
        other
            .exact
            .cmp(&self.exact)
            .then(other.alias_hits.cmp(&self.alias_hits))
            .then(other.fuzzy_score.cmp(&self.fuzzy_score))
            .then(self.name.cmp(&other.name))
    }
}

/// Ranks catalog layers against user vocabulary using nucleo-matcher.
///
/// Only feeds suggestions; validation never substitutes a ranked name.
pub struct CatalogMatcher {
    matcher: Matcher,
}

impl CatalogMatcher {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Layers related to `term`, most relevant first. Unrelated layers are
    /// left out.
    pub fn rank(&mut self, term: &str, catalog: &Catalog) -> Vec<LayerMatch> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }
        let lowered = term.to_lowercase();
        let words = split_words(&lowered);
        let pattern = Pattern::parse(&lowered, CaseMatching::Ignore, Normalization::Smart);

        let mut matches: Vec<LayerMatch> = catalog
            .entries()
            .filter_map(|entry| {
                let exact = entry.name == lowered;
                let alias_hits = words
                    .iter()
                    .filter(|word| entry.aliases.contains(word.as_str()))
                    .count();
                let fuzzy_score = std::iter::once(entry.name.as_str())
                    .chain(entry.aliases.iter().map(String::as_str))
                    .filter_map(|candidate| {
                        let haystack = Utf32String::from(candidate);
                        pattern.score(haystack.slice(..), &mut self.matcher)
                    })
                    .max()
                    .unwrap_or(0);

                (exact || alias_hits > 0 || fuzzy_score > 0).then(|| LayerMatch {
                    name: entry.name.clone(),
                    exact,
                    alias_hits,
                    fuzzy_score,
                })
            })
            .collect();

        matches.sort_by(LayerMatch::relevance);
        matches
    }

    /// Names of the `limit` best matches.
    pub fn suggest(&mut self, term: &str, catalog: &Catalog, limit: usize) -> Vec<String> {
        self.rank(term, catalog)
            .into_iter()
            .take(limit)
            .map(|m| m.name)
            .collect()
    }
}

impl Default for CatalogMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::synonyms::SynonymTable;
    use crate::tokenizer::TokenizerConfig;
    use gis_geometry::GeometryKind;
    use gis_layer_store::LayerInfo;

    fn catalog() -> Catalog {
        let synonyms: SynonymTable = [
            ("education", vec!["education", "school", "schools"]),
            ("pipelines", vec!["pipeline", "oil", "gas"]),
            ("hospitals", vec!["hospital", "clinic", "health"]),
        ]
        .into_iter()
        .collect();
        let builder = CatalogBuilder::new(&TokenizerConfig::default(), synonyms);
        let infos: Vec<LayerInfo> = ["a_arctic_education_osm", "oil_pipelines", "hospitals"]
            .into_iter()
            .map(|name| LayerInfo {
                name: name.to_string(),
                geometry_type: GeometryKind::Point,
                feature_count: 1,
                source: None,
            })
            .collect();
        builder.build_from_infos(&infos)
    }

    #[test]
    fn exact_name_ranks_first() {
        let mut matcher = CatalogMatcher::new();
        let ranked = matcher.rank("hospitals", &catalog());
        assert_eq!(ranked[0].name, "hospitals");
        assert!(ranked[0].exact);
    }

    #[test]
    fn synonyms_resolve_user_vocabulary() {
        let mut matcher = CatalogMatcher::new();
        assert_eq!(
            matcher.suggest("schools", &catalog(), 1),
            vec!["a_arctic_education_osm"]
        );
        assert_eq!(matcher.suggest("gas pipeline", &catalog(), 1), vec!["oil_pipelines"]);
    }

    #[test]
    fn typos_fall_back_to_fuzzy_scores() {
        let mut matcher = CatalogMatcher::new();
        let ranked = matcher.rank("hosptals", &catalog());
        assert_eq!(ranked.first().map(|m| m.name.as_str()), Some("hospitals"));
        assert_eq!(ranked[0].alias_hits, 0);
        assert!(ranked[0].fuzzy_score > 0);
    }

    #[test]
    fn blank_term_matches_nothing() {
        let mut matcher = CatalogMatcher::new();
        assert!(matcher.rank("   ", &catalog()).is_empty());
    }
}
