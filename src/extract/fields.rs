//! Field mappings produced by the extractors
//!
//! [`ExtractedFields`] is what a single extraction strategy yields for one page.
//! [`CompanyRecord`] is the finalized, flattened mapping stored in the result
//! set, written to checkpoints, and exported.

use crate::extract::normalize::join_values;
use serde::{Deserialize, Serialize};

/// Fields found on one page by a single extraction strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub website: Option<String>,
    pub status: Option<String>,
    pub primary_partner: Option<String>,
    pub founded_year: Option<i64>,
    pub team_size: Option<i64>,
    pub batch: Option<String>,
    pub location: Option<String>,
    pub active_founders: Vec<String>,
    pub founders_linkedin: Vec<String>,
}

impl ExtractedFields {
    /// Combines two extraction results field by field
    ///
    /// A value from `self` is kept unless it is absent or empty, in which case
    /// the value from `fallback` is used.
    pub fn merge(self, fallback: ExtractedFields) -> ExtractedFields {
        ExtractedFields {
            website: prefer_text(self.website, fallback.website),
            status: prefer_text(self.status, fallback.status),
            primary_partner: prefer_text(self.primary_partner, fallback.primary_partner),
            founded_year: self.founded_year.or(fallback.founded_year),
            team_size: self.team_size.or(fallback.team_size),
            batch: prefer_text(self.batch, fallback.batch),
            location: prefer_text(self.location, fallback.location),
            active_founders: prefer_list(self.active_founders, fallback.active_founders),
            founders_linkedin: prefer_list(self.founders_linkedin, fallback.founders_linkedin),
        }
    }

    /// Returns true if no field carries a value
    pub fn is_empty(&self) -> bool {
        *self == ExtractedFields::default()
    }

    /// Finalizes the fields into a record for `link`
    ///
    /// List fields are joined with [`join_values`]; a list that joins to an
    /// empty string becomes absent.
    pub fn into_record(self, link: &str) -> CompanyRecord {
        CompanyRecord {
            link: link.to_string(),
            active_founders: joined(&self.active_founders),
            founders_linkedin: joined(&self.founders_linkedin),
            status: self.status,
            website: self.website,
            primary_partner: self.primary_partner,
            founded_year: self.founded_year,
            team_size: self.team_size,
            batch: self.batch,
            location: self.location,
        }
    }
}

fn prefer_text(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    match primary {
        Some(value) if !value.is_empty() => Some(value),
        _ => fallback,
    }
}

fn prefer_list(primary: Vec<String>, fallback: Vec<String>) -> Vec<String> {
    if primary.is_empty() {
        fallback
    } else {
        primary
    }
}

fn joined(values: &[String]) -> Option<String> {
    Some(join_values(values)).filter(|s| !s.is_empty())
}

/// The finalized field mapping for one target
///
/// Field order matches the export column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub active_founders: Option<String>,
    #[serde(default)]
    pub founders_linkedin: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub primary_partner: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i64>,
    #[serde(default)]
    pub team_size: Option<i64>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl CompanyRecord {
    /// A record holding only the link, used when no page content was obtained
    pub fn placeholder(link: &str) -> Self {
        Self {
            link: link.to_string(),
            ..Self::default()
        }
    }

    /// Returns true if any field besides the link carries a value
    pub fn has_data(&self) -> bool {
        let texts = [
            &self.active_founders,
            &self.founders_linkedin,
            &self.status,
            &self.website,
            &self.primary_partner,
            &self.batch,
            &self.location,
        ];
        texts
            .iter()
            .any(|t| t.as_deref().is_some_and(|s| !s.is_empty()))
            || self.founded_year.is_some()
            || self.team_size.is_some()
    }
}
