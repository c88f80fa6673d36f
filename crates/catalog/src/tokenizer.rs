use serde::{Deserialize, Serialize};

/// Decorative segments removed from layer names before splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub leading_markers: Vec<String>,
    pub trailing_markers: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            leading_markers: vec!["a_".to_string()],
            trailing_markers: vec!["_osm".to_string()],
        }
    }
}

/// Splits layer names into lowercase word tokens
#[derive(Debug, Clone)]
pub struct Tokenizer {
    leading: Vec<String>,
    trailing: Vec<String>,
}

impl Tokenizer {
    pub fn new(config: &TokenizerConfig) -> Self {
        let lower = |markers: &[String]| {
            markers
                .iter()
                .map(|m| m.to_lowercase())
                .filter(|m| !m.is_empty())
                .collect()
        };
        Self {
            leading: lower(&config.leading_markers),
            trailing: lower(&config.trailing_markers),
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&TokenizerConfig::default())
    }
}

impl Tokenizer {
    /// Lowercase, strip one leading and one trailing marker, split on
    /// non-letter runs.
    pub fn tokenize(&self, name: &str) -> Vec<String> {
        let lowered = name.to_lowercase();
        let mut rest = lowered.as_str();

        if let Some(stripped) = self
            .leading
            .iter()
            .find_map(|marker| rest.strip_prefix(marker.as_str()))
            .filter(|stripped| !stripped.is_empty())
        {
            rest = stripped;
        }
        if let Some(stripped) = self
            .trailing
            .iter()
            .find_map(|marker| rest.strip_suffix(marker.as_str()))
            .filter(|stripped| !stripped.is_empty())
        {
            rest = stripped;
        }

        split_words(rest)
    }
}

/// Lowercase words of free text, split on anything that is not a letter.
pub(crate) fn split_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
