//! Citations for material data.
//!
//! References are keyed by their id. Combining two collections keeps the
//! entry that was there first when both cite the same id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cited work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Reference {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Reference {
            id: id.into(),
            kind: kind.into(),
            title: None,
            author: Vec::new(),
            year: None,
            annote: None,
            url: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author.push(author.into());
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Copy of this reference with a note appended (e.g. the equation used)
    pub fn annotate(&self, note: &str) -> Reference {
        let mut out = self.clone();
        out.annote = Some(match &self.annote {
            Some(a) if !a.is_empty() => format!("{} {}", a, note),
            _ => note.to_string(),
        });
        out
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.author.is_empty() {
            write!(f, "{}. ", self.author.join(", "))?;
        }
        if let Some(title) = &self.title {
            write!(f, "{}", title)?;
        }
        if let Some(year) = &self.year {
            write!(f, " ({})", year)?;
        }
        Ok(())
    }
}

/// A collection of references keyed by id
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct References {
    entries: BTreeMap<String, Reference>,
}

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Reference> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.values()
    }

    /// Add a reference unless one with the same id is already present
    pub fn add(&mut self, reference: Reference) {
        self.entries.entry(reference.id.clone()).or_insert(reference);
    }

    /// Union of both collections; entries already present win
    pub fn combine(mut self, other: &References) -> References {
        for r in other.iter() {
            self.add(r.clone());
        }
        self
    }
}

impl From<Reference> for References {
    fn from(reference: Reference) -> Self {
        let mut refs = References::new();
        refs.add(reference);
        refs
    }
}

impl FromIterator<Reference> for References {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        let mut refs = References::new();
        for r in iter {
            refs.add(r);
        }
        refs
    }
}

impl std::fmt::Display for References {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(k, r)| format!("[{}] {}", k, r))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Merge two optional collections, keeping `first`'s entries on conflict
pub fn merge(first: Option<References>, second: Option<&References>) -> Option<References> {
    match (first, second) {
        (Some(a), Some(b)) => Some(a.combine(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}
