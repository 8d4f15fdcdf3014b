//! Extraction from the embedded page-state JSON
//!
//! Company pages ship their data in a `<script id="__NEXT_DATA__">` block. Its
//! shape has changed over time, so each field is looked up by a list of
//! candidate keys (first match wins), searched depth-first across the whole
//! tree. Adapting to a new shape means editing the key tables below.

use crate::config::SiteConfig;
use crate::extract::fields::ExtractedFields;
use crate::extract::normalize::{coerce_json_int, is_truthy, points_to_domain, scalar_text};
use scraper::{Html, Selector};
use serde_json::Value;

const COMPANY_KEYS: &[&str] = &["company", "startup", "startupData", "pageData"];
const WEBSITE_KEYS: &[&str] = &["website", "websiteUrl", "url"];
const STATUS_KEYS: &[&str] = &["status", "companyStatus"];
const PARTNER_KEYS: &[&str] = &["primaryPartner", "primary_partner", "primary_partner_name"];
const FOUNDED_KEYS: &[&str] = &["founded", "foundedYear", "founded_year"];
const TEAM_SIZE_KEYS: &[&str] = &["teamSize", "team_size", "teamsize"];
const BATCH_KEYS: &[&str] = &["batch", "ycBatch", "yc_batch"];
const LOCATION_KEYS: &[&str] = &["location", "hqLocation", "city"];
const FOUNDERS_KEYS: &[&str] = &["founders", "team", "founderData"];

const FOUNDER_NAME_KEYS: &[&str] = &["name", "full_name", "display_name"];
const FOUNDER_LINK_KEYS: &[&str] = &["linkedin_url", "linkedin", "linkedinUrl"];

/// Extracts fields from the page's embedded JSON payload
///
/// Returns empty fields if the payload is missing or malformed.
pub fn extract_structured(html: &str, site: &SiteConfig) -> ExtractedFields {
    let document = Html::parse_document(html);
    match page_data(&document) {
        Some(data) => extract_from_value(&data, site),
        None => ExtractedFields::default(),
    }
}

/// Locates and parses the `__NEXT_DATA__` script block
fn page_data(document: &Html) -> Option<Value> {
    let selector = Selector::parse("script#__NEXT_DATA__").ok()?;
    let script = document.select(&selector).next()?;
    let text: String = script.text().collect();
    if text.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Malformed page data payload: {}", e);
            None
        }
    }
}

/// Extracts fields from an already parsed payload
pub fn extract_from_value(data: &Value, site: &SiteConfig) -> ExtractedFields {
    let root = match find_first(data, COMPANY_KEYS) {
        Some(company @ (Value::Object(_) | Value::Array(_))) => company,
        _ => data,
    };

    let (active_founders, founders_linkedin) = find_first(root, FOUNDERS_KEYS)
        .map(founders)
        .unwrap_or_default();

    ExtractedFields {
        website: website(root, &site.host),
        status: find_first(root, STATUS_KEYS).and_then(|v| named_text(v, &["label", "text"])),
        primary_partner: find_first(root, PARTNER_KEYS)
            .and_then(|v| named_text(v, &["name", "full_name"])),
        founded_year: find_first(root, FOUNDED_KEYS).and_then(coerce_json_int),
        team_size: find_first(root, TEAM_SIZE_KEYS).and_then(coerce_json_int),
        batch: find_first(root, BATCH_KEYS).and_then(|v| named_text(v, &["name", "label"])),
        location: find_first(root, LOCATION_KEYS)
            .and_then(|v| named_text(v, &["name", "displayName"])),
        active_founders,
        founders_linkedin,
    }
}

/// Returns the value of the first candidate key found anywhere in the tree
///
/// Candidates are tried in order; each is searched depth-first, so an earlier
/// candidate deep in the tree beats a later candidate at the top level.
pub fn find_first<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| find_key(value, key))
}

fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.iter().find_map(|(k, v)| {
            if k == key {
                Some(v)
            } else {
                find_key(v, key)
            }
        }),
        Value::Array(items) => items.iter().find_map(|item| find_key(item, key)),
        _ => None,
    }
}

/// Unwraps a value that may be a `{name: ..}`-style object into display text
fn named_text(value: &Value, sub_keys: &[&str]) -> Option<String> {
    match value {
        Value::Object(map) => sub_keys
            .iter()
            .filter_map(|k| map.get(*k))
            .find(|v| is_truthy(v))
            .and_then(scalar_text),
        other => scalar_text(other),
    }
}

fn website(root: &Value, site_host: &str) -> Option<String> {
    let mut value = find_first(root, WEBSITE_KEYS)?;
    if let Value::Array(items) = value {
        value = items.first()?;
    }
    if let Value::Object(map) = value {
        if let Some(url) = map.get("url") {
            value = url;
        }
    }

    match value {
        Value::String(url) if !url.is_empty() && !points_to_domain(url, site_host) => {
            Some(url.clone())
        }
        _ => None,
    }
}

/// Collects active founder names and every founder's profile link
fn founders(value: &Value) -> (Vec<String>, Vec<String>) {
    let mut names = Vec::new();
    let mut links = Vec::new();

    let Value::Array(entries) = value else {
        return (names, links);
    };

    for founder in entries.iter().filter_map(Value::as_object) {
        let active = founder.get("is_active").map_or(true, |flag| {
            flag.is_null() || is_truthy(flag)
        });

        let name = FOUNDER_NAME_KEYS
            .iter()
            .filter_map(|k| founder.get(*k))
            .find(|v| is_truthy(v))
            .and_then(scalar_text);
        if active {
            names.extend(name);
        }

        let link = FOUNDER_LINK_KEYS
            .iter()
            .filter_map(|k| founder.get(*k))
            .find(|v| is_truthy(v))
            .or_else(|| {
                founder
                    .get("social")
                    .and_then(|social| social.get("linkedin"))
                    .filter(|v| is_truthy(v))
            })
            .and_then(scalar_text);
        links.extend(link);
    }

    (names, links)
}
