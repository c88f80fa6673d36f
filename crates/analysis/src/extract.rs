use crate::error::Result;
use crate::pipeline::{Intent, IntentExtractor};
use async_trait::async_trait;
use gis_catalog::{Catalog, CatalogMatcher};
use gis_protocol::{DistanceUnit, QueryParams};
use once_cell::sync::Lazy;
use regex::Regex;

static PROXIMITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*(?P<target>.+?)\s+
        within\s+
        (?P<distance>\d+(?:\.\d+)?)\s*
        (?P<unit>[a-z]+)\s+
        (?:of|from)\s+
        (?P<buffer>.+?)
        [\s?.!]*$",
    )
    .expect("valid proximity regex")
});

const FILLER_WORDS: &[&str] = &[
    "how", "many", "which", "what", "show", "me", "find", "list", "all", "the", "are", "is",
    "there", "that", "any", "a", "an",
];

/// Rule-based extractor for "<target> within <distance> <unit> of <buffer>".
///
/// Layer phrases are mapped to catalog names through [`CatalogMatcher`];
/// a phrase nothing matches is passed on as-is so validation can report it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, question: &str, catalog: &Catalog) -> Intent {
        let Some(caps) = PROXIMITY_RE.captures(question) else {
            return Intent::NoSpatialIntent {
                reply: format!(
                    "I can answer proximity questions such as 'schools within 1 mile of \
                     pipelines'. Available datasets: {}.",
                    catalog.names().join(", ")
                ),
            };
        };

        let distance = caps["distance"].parse::<f64>().unwrap_or(f64::NAN);
        let unit = canonical_unit(&caps["unit"]);
        let mut matcher = CatalogMatcher::new();
        let target = resolve_layer(&mut matcher, &caps["target"], catalog);
        let buffer = resolve_layer(&mut matcher, &caps["buffer"], catalog);
        log::debug!("Extracted '{target}' within {distance} {unit} of '{buffer}'");

        Intent::Buffer(QueryParams::new(target, buffer, distance, unit))
    }
}

#[async_trait]
impl IntentExtractor for PatternExtractor {
    async fn extract(&self, question: &str, catalog: &Catalog) -> Result<Intent> {
        Ok(self.parse(question, catalog))
    }
}

fn canonical_unit(raw: &str) -> String {
    let unit = match raw.to_lowercase().as_str() {
        "mi" | "mile" | "miles" => DistanceUnit::Miles,
        "km" | "kms" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
            DistanceUnit::Kilometers
        }
        "m" | "meter" | "meters" | "metre" | "metres" => DistanceUnit::Meters,
        "ft" | "foot" | "feet" => DistanceUnit::Feet,
        other => return other.to_string(),
    };
    unit.as_str().to_string()
}

fn resolve_layer(matcher: &mut CatalogMatcher, phrase: &str, catalog: &Catalog) -> String {
    let words: Vec<String> = phrase
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .map(str::to_lowercase)
        .filter(|word| !word.is_empty() && !FILLER_WORDS.contains(&word.as_str()))
        .collect();
    let term = words.join(" ");
    if term.is_empty() {
        return phrase.trim().to_lowercase();
    }
    if catalog.contains(&words.join("_")) {
        return words.join("_");
    }
    matcher
        .suggest(&term, catalog, 1)
        .into_iter()
        .next()
        .unwrap_or_else(|| words.join("_"))
}
