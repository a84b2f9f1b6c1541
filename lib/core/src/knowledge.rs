//! Knowledge bases consumed by pebble generation and verification
//!
//! Both bases are read-only once loaded. A label missing from a base is not an
//! error; the corresponding evidence source is simply skipped for that segment.

use crate::{Error, Result};
use ahash::AHashMap;
use std::fmt;
use std::str::FromStr;

/// Hierarchical taxonomy coordinate, e.g. `1.4.2`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dewey {
    path: Vec<u32>,
}

impl Dewey {
    #[inline]
    #[must_use]
    pub fn new(path: Vec<u32>) -> Self {
        Self { path }
    }

    #[inline]
    pub fn path(&self) -> &[u32] {
        &self.path
    }

    /// Number of components, counting the node itself
    #[inline]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The enclosing node, or `None` at the root level
    pub fn parent(&self) -> Option<Dewey> {
        if self.path.len() <= 1 {
            None
        } else {
            Some(Dewey::new(self.path[..self.path.len() - 1].to_vec()))
        }
    }

    /// The node followed by all of its ancestors, deepest first
    pub fn lineage(&self) -> impl Iterator<Item = Dewey> + '_ {
        (1..=self.path.len()).rev().map(move |len| Dewey::new(self.path[..len].to_vec()))
    }

    /// Length of the longest common prefix of two paths
    pub fn common_prefix_len(&self, other: &Dewey) -> usize {
        self.path
            .iter()
            .zip(other.path.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Longest-common-prefix similarity: `lcp / max(depth)`
    pub fn similarity(&self, other: &Dewey) -> f64 {
        let longest = self.depth().max(other.depth());
        if longest == 0 {
            return 0.0;
        }
        self.common_prefix_len(other) as f64 / longest as f64
    }
}

impl fmt::Display for Dewey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for Dewey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::parse("empty dewey path"));
        }
        let path = s
            .split('.')
            .map(|component| {
                component
                    .parse::<u32>()
                    .map_err(|_| Error::parse(format!("invalid dewey component '{}' in '{}'", component, s)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { path })
    }
}

/// Label to hierarchy path lookup
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    nodes: AHashMap<String, Dewey>,
}

impl Taxonomy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, dewey: Dewey) {
        self.nodes.insert(label.into(), dewey);
    }

    #[inline]
    pub fn get(&self, label: &str) -> Option<&Dewey> {
        self.nodes.get(label)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, Dewey)> for Taxonomy {
    fn from_iter<I: IntoIterator<Item = (L, Dewey)>>(iter: I) -> Self {
        let mut taxonomy = Taxonomy::new();
        for (label, dewey) in iter {
            taxonomy.insert(label, dewey);
        }
        taxonomy
    }
}

/// Label to canonical form lookup
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    canonical: AHashMap<String, String>,
}

impl SynonymTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canonical label with its synonyms. The canonical label maps to itself.
    pub fn insert_group<S: AsRef<str>>(&mut self, canonical: &str, synonyms: impl IntoIterator<Item = S>) {
        self.canonical.insert(canonical.to_string(), canonical.to_string());
        for synonym in synonyms {
            let synonym = synonym.as_ref().trim();
            if !synonym.is_empty() {
                self.canonical.insert(synonym.to_string(), canonical.to_string());
            }
        }
    }

    #[inline]
    pub fn canonical(&self, label: &str) -> Option<&str> {
        self.canonical.get(label).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// The evidence sources enabled for a join
#[derive(Debug, Clone, Default)]
pub struct EvidenceSources {
    pub taxonomy: Option<Taxonomy>,
    pub synonyms: Option<SynonymTable>,
    pub gram_size: Option<usize>,
}

impl EvidenceSources {
    pub fn validate(&self) -> Result<()> {
        if self.taxonomy.is_none() && self.synonyms.is_none() && self.gram_size.is_none() {
            return Err(Error::InvalidConfig(
                "at least one of taxonomy, synonym or jaccard evidence must be enabled".to_string(),
            ));
        }
        if let Some(gram) = self.gram_size {
            if gram < 2 {
                return Err(Error::InvalidConfig(format!("gram size must be at least 2, got {}", gram)));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn dewey(&self, label: &str) -> Option<&Dewey> {
        self.taxonomy.as_ref().and_then(|t| t.get(label))
    }

    #[inline]
    pub fn canonical(&self, label: &str) -> Option<&str> {
        self.synonyms.as_ref().and_then(|s| s.canonical(label))
    }

    /// Labels known to the taxonomy or synonym table take no n-gram evidence
    #[inline]
    pub fn is_trusted(&self, label: &str) -> bool {
        self.dewey(label).is_some() || self.canonical(label).is_some()
    }
}
