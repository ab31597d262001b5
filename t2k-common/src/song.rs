//! Song records as stored in the chart dataset
//!
//! Field names follow the dataset's JSON layout (camelCase, except the theme
//! colors). Optional strings that are present but empty are read as absent, so
//! a `Some` value is always non-empty.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU32;

/// One chart entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub artist: String,
    pub title: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub cover_url: Option<String>,
    /// Preview audio; songs without it are skipped when audio is required
    #[serde(default, deserialize_with = "non_empty")]
    pub preview_url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub language: Option<String>,
    /// Chart rank per year label ("1999" -> 1)
    #[serde(default, deserialize_with = "unique_map")]
    pub positions: BTreeMap<String, NonZeroU32>,
    #[serde(default)]
    pub external: ExternalRefs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl Song {
    /// Chart rank for a year, if the song was listed that year
    pub fn rank(&self, year: &str) -> Option<u32> {
        self.positions.get(year).map(|rank| rank.get())
    }

    pub fn has_position(&self, year: &str) -> bool {
        self.positions.contains_key(year)
    }

    pub fn has_preview(&self) -> bool {
        self.preview_url.is_some()
    }
}

/// References to external services, at most one per service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top2000: Option<Top2000Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genius: Option<GeniusRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<SpotifyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<YoutubeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deezer: Option<DeezerRef>,
}

/// Links into the historical chart listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Top2000Links {
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub history_url: Option<String>,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeniusRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyRef {
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeRef {
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Deezer track id, also used to resolve fresh preview URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeezerRef {
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Display color hints derived from the cover art
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default, deserialize_with = "non_empty")]
    pub primary_color: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub secondary_color: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub text_color: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Deserialize a JSON object into a map, rejecting repeated keys
///
/// serde_json keeps the last value of a repeated key when building a map; the
/// dataset treats that as corruption instead.
pub(crate) fn unique_map<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct UniqueMapVisitor<V>(PhantomData<V>);

    impl<'de, V> Visitor<'de> for UniqueMapVisitor<V>
    where
        V: Deserialize<'de>,
    {
        type Value = BTreeMap<String, V>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map with unique string keys")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut map = BTreeMap::new();
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                match map.entry(key) {
                    btree_map::Entry::Occupied(e) => {
                        return Err(de::Error::custom(format!("duplicate key `{}`", e.key())));
                    }
                    btree_map::Entry::Vacant(e) => {
                        e.insert(value);
                    }
                }
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueMapVisitor(PhantomData))
}
