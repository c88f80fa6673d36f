use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Synonym dictionary: token -> [synonyms]
///
/// Keys and values are lowercased on construction. Deployments supply the
/// table; an empty table makes aliases equal to tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, Vec<String>>", into = "HashMap<String, Vec<String>>")]
pub struct SynonymTable {
    synonyms: HashMap<String, Vec<String>>,
}

impl SynonymTable {
    pub fn new(synonyms: HashMap<String, Vec<String>>) -> Self {
        let mut table: HashMap<String, Vec<String>> = HashMap::new();
        for (key, values) in synonyms {
            let entry = table.entry(key.trim().to_lowercase()).or_default();
            for value in values {
                let value = value.trim().to_lowercase();
                if !value.is_empty() && !entry.contains(&value) {
                    entry.push(value);
                }
            }
        }
        table.retain(|key, _| !key.is_empty());
        Self { synonyms: table }
    }

    pub fn get(&self, token: &str) -> Option<&[String]> {
        self.synonyms.get(token).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }

    /// Tokens plus the synonyms of every token the table knows.
    pub fn aliases_for(&self, tokens: &[String]) -> BTreeSet<String> {
        let mut aliases: BTreeSet<String> = tokens.iter().cloned().collect();
        for token in tokens {
            if let Some(synonyms) = self.get(token) {
                aliases.extend(synonyms.iter().cloned());
            }
        }
        aliases
    }
}

impl From<HashMap<String, Vec<String>>> for SynonymTable {
    fn from(synonyms: HashMap<String, Vec<String>>) -> Self {
        Self::new(synonyms)
    }
}

impl From<SynonymTable> for HashMap<String, Vec<String>> {
    fn from(table: SynonymTable) -> Self {
        table.synonyms
    }
}

impl<K, V, I> FromIterator<(K, I)> for SynonymTable
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = V>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(key, values)| (key.into(), values.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}
