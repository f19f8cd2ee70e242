//! Record shapes flowing through the catalog pipeline.
//!
//! Scrapers emit loosely-shaped JSON objects. [`RawRecord`] accepts anything
//! object-shaped and keeps every field, while [`Performance`] is the strict
//! form the rest of the pipeline works with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Genre values that follow their own lifecycle and skip date/region/venue checks.
pub const GENRE_MOVIE: &str = "movie";
pub const GENRE_TRAVEL: &str = "travel";

/// An unnormalized listing as emitted by one upstream source.
///
/// Every field is optional and may be of any JSON type; the Normalizer decides
/// how to coerce it. Fields outside the known set are carried in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub venue: Option<Value>,
    #[serde(default)]
    pub link: Option<Value>,
    #[serde(default)]
    pub region: Option<Value>,
    #[serde(default)]
    pub genre: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub discount: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The canonical normalized listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    pub id: String,
    pub title: String,
    pub image: String,
    pub date: String,
    pub venue: String,
    pub link: String,
    pub region: String,
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    /// Source-specific fields passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Performance {
    /// True when the record carries a usable price. An empty string counts as no price.
    pub fn has_price(&self) -> bool {
        self.price.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    /// Movies and travel deals are not tied to a ticketed date or a metro venue.
    pub fn is_lifecycle_exempt(&self, exempt_genres: &[String]) -> bool {
        exempt_genres.iter().any(|g| g == &self.genre)
    }
}

/// The final filtered, deduplicated sequence of performances.
///
/// Serializes as a bare JSON array so the rendering layer can read it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    performances: Vec<Performance>,
}

impl Catalog {
    pub fn new(performances: Vec<Performance>) -> Self {
        Self { performances }
    }

    pub fn len(&self) -> usize {
        self.performances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.performances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Performance> {
        self.performances.iter()
    }

    pub fn as_slice(&self) -> &[Performance] {
        &self.performances
    }

    pub fn into_inner(self) -> Vec<Performance> {
        self.performances
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Performance;
    type IntoIter = std::slice::Iter<'a, Performance>;

    fn into_iter(self) -> Self::IntoIter {
        self.performances.iter()
    }
}
