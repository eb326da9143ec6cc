//! Wire types for the subset of the Zotero Web API v3 that `zog` reads.
//!
//! The local Zotero API (Zotero 7+) serves the same JSON shapes, so these types are shared by
//! both access modes. Fields we don't use are ignored during deserialization.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;

/// Predicate Zotero uses for "related item" links.
pub const DC_RELATION: &str = "dc:relation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryType {
    #[default]
    User,
    Group,
}

impl LibraryType {
    pub fn path_prefix(self) -> &'static str {
        match self {
            LibraryType::User => "users",
            LibraryType::Group => "groups",
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryType::User => f.write_str("user"),
            LibraryType::Group => f.write_str("group"),
        }
    }
}

impl std::str::FromStr for LibraryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(LibraryType::User),
            "group" => Ok(LibraryType::Group),
            other => Err(format!("invalid library type `{other}` (expected `user` or `group`)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Collection {
    pub key: String,
    pub data: CollectionData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionData {
    pub key: String,
    pub name: String,
    /// `None` for top-level collections. The API sends `false` in that case.
    #[serde(
        rename = "parentCollection",
        default,
        deserialize_with = "deserialize_parent_collection"
    )]
    pub parent_collection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Item {
    pub key: String,
    pub data: ItemData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemData {
    pub key: String,
    #[serde(rename = "itemType", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub relations: Relations,
}

/// Item relations keyed by predicate.
///
/// Zotero stores a single related URI as a bare string and several as an array, so every value
/// is normalized to a list here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Relations(BTreeMap<String, OneOrMany>);

impl Relations {
    /// Related URIs for `predicate`, or `None` when the predicate is absent.
    pub fn get(&self, predicate: &str) -> Option<&[String]> {
        self.0.get(predicate).map(OneOrMany::as_slice)
    }

    pub fn related(&self) -> Option<&[String]> {
        self.get(DC_RELATION)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OneOrMany(Vec<String>);

impl OneOrMany {
    fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for OneOrMany {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(uri) => OneOrMany(vec![uri]),
            Raw::Many(uris) => OneOrMany(uris),
        })
    }
}

fn deserialize_parent_collection<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Key(String),
        Flag(#[allow(dead_code)] bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Key(key)) if !key.is_empty() => Some(key),
        _ => None,
    })
}
