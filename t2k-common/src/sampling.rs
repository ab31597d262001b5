//! Constrained random sampling over the catalog
//!
//! A [`SampleQuery`] narrows the catalog to an eligible subset and asks for `n`
//! distinct songs from it, drawn uniformly without replacement. When the subset
//! is smaller than `n` the query fails with
//! [`Error::InsufficientResults`]; a short result is never returned.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::catalog::{self, Catalog, CatalogCache};
use crate::song::Song;
use crate::{Error, Result};

/// Request shape for a random sample
///
/// ```
/// use t2k_common::SampleQuery;
///
/// let query: SampleQuery = serde_json::from_str(r#"{ "n": 2, "years": ["2023"] }"#).unwrap();
/// assert!(query.require_audio);
/// assert!(query.exclude.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleQuery {
    /// Number of songs to return
    pub n: usize,

    /// Years a song must have a chart position for (all of them)
    #[serde(default)]
    pub years: Option<Vec<String>>,

    /// Keys that must not be returned
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Only songs with a preview URL
    #[serde(default = "default_require_audio")]
    pub require_audio: bool,
}

fn default_require_audio() -> bool {
    true
}

impl SampleQuery {
    /// Query for `n` songs with preview audio and no other constraint
    pub fn new(n: usize) -> Self {
        Self {
            n,
            years: None,
            exclude: Vec::new(),
            require_audio: default_require_audio(),
        }
    }

    pub fn with_years<I, S>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.years = Some(years.into_iter().map(Into::into).collect());
        self
    }

    pub fn excluding<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn require_audio(mut self, required: bool) -> Self {
        self.require_audio = required;
        self
    }

    /// Reject queries that can never be answered
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::InvalidInput("n must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Eligibility test compiled from a query
struct Filter<'q> {
    years: &'q [String],
    exclude: HashSet<&'q str>,
    require_audio: bool,
}

impl<'q> Filter<'q> {
    fn new(query: &'q SampleQuery) -> Self {
        Self {
            years: query.years.as_deref().unwrap_or_default(),
            exclude: query.exclude.iter().map(String::as_str).collect(),
            require_audio: query.require_audio,
        }
    }

    fn accepts(&self, key: &str, song: &Song) -> bool {
        self.years.iter().all(|year| song.has_position(year))
            && !self.exclude.contains(key)
            && (!self.require_audio || song.has_preview())
    }
}

/// Songs matching every constraint of the query, in key order
///
/// `n` is not considered here.
pub fn eligible<'a>(catalog: &'a Catalog, query: &SampleQuery) -> Vec<(&'a str, &'a Song)> {
    let filter = Filter::new(query);
    catalog
        .iter()
        .filter(|(key, song)| filter.accepts(key, song))
        .collect()
}

/// Draw `query.n` distinct eligible songs using `rng`
///
/// Every size-`n` subset of the eligible songs is equally likely, and the
/// returned order is random too.
///
/// # Errors
///
/// - [`Error::InvalidInput`] if `n` is 0
/// - [`Error::InsufficientResults`] if fewer than `n` songs are eligible
pub fn sample_with_rng<'a, R>(
    catalog: &'a Catalog,
    query: &SampleQuery,
    rng: &mut R,
) -> Result<Vec<(&'a str, &'a Song)>>
where
    R: Rng + ?Sized,
{
    query.validate()?;

    let mut pool = eligible(catalog, query);
    if pool.len() < query.n {
        debug!(
            "Sample of {} refused: only {} of {} songs eligible",
            query.n,
            pool.len(),
            catalog.len()
        );
        return Err(Error::InsufficientResults {
            requested: query.n,
            available: pool.len(),
        });
    }

    let available = pool.len();
    let (chosen, _) = pool.partial_shuffle(rng, query.n);
    debug!("Sampled {} of {} eligible songs", chosen.len(), available);
    Ok(chosen.to_vec())
}

impl CatalogCache {
    /// Sample from this cache's catalog, loading it first if needed
    pub async fn sample(&self, query: &SampleQuery) -> Result<Vec<(String, Song)>> {
        query.validate()?;
        let catalog = self.get().await?;

        let picked = sample_with_rng(&catalog, query, &mut rand::thread_rng())?;
        Ok(picked
            .into_iter()
            .map(|(key, song)| (key.to_string(), song.clone()))
            .collect())
    }
}

/// Sample from the process-wide catalog
pub async fn sample(query: &SampleQuery) -> Result<Vec<(String, Song)>> {
    catalog::global().sample(query).await
}
