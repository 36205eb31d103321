// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! JSON Resource Descriptor (RFC 7033 section 4.4) types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Media type served for WebFinger responses.
pub const JRD_CONTENT_TYPE: &str = "application/jrd+json";

/// A WebFinger JRD document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Canonical identifier of the described entity
    #[serde(default)]
    pub subject: String,

    /// Alternative identifiers, in configured order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Relation links, in configured order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// A single link relation in a JRD.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Relation type, either a registered name or a URI
    #[serde(default)]
    pub rel: String,

    /// Media type of the link target
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub media_type: Option<String>,

    /// Link target
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub href: Option<String>,

    /// Human-readable labels keyed by language tag
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "null_values_as_empty"
    )]
    pub titles: BTreeMap<String, String>,

    /// Extra properties keyed by property URI; a null value is stored as ""
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "null_values_as_empty"
    )]
    pub properties: BTreeMap<String, String>,
}

impl ResourceDescriptor {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Encode the descriptor as a JRD body.
    pub fn to_jrd(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl Link {
    pub fn new(rel: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_title(mut self, lang: impl Into<String>, title: impl Into<String>) -> Self {
        self.titles.insert(lang.into(), title.into());
        self
    }

    pub fn with_property(mut self, uri: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(uri.into(), value.into());
        self
    }
}

// Older config files use "" for unset fields.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn null_values_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let map = Option::<BTreeMap<String, Option<String>>>::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}
