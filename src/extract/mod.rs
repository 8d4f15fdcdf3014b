//! Field extraction from company pages
//!
//! Two independent strategies run on every page:
//! - [`extract_structured`] reads the embedded page-state JSON
//! - [`extract_fallback`] scans the rendered HTML for labels and links
//!
//! Their outputs are merged field by field, structured values winning unless
//! empty. All functions here are synchronous and run inline on the async
//! workers.

mod fallback;
mod fields;
mod normalize;
mod structured;

pub use fallback::{extract_fallback, extract_from_document, HtmlDocument, PageDocument};
pub use fields::{CompanyRecord, ExtractedFields};
pub use normalize::{coerce_int, coerce_json_int, join_values, points_to_domain};
pub use structured::{extract_from_value, extract_structured, find_first};

use crate::config::SiteConfig;

/// Extracts and merges fields from one page
///
/// # Example
///
/// ```
/// use yc_harvest::config::SiteConfig;
/// use yc_harvest::extract::extract_fields;
///
/// let html = r#"<html><body><span>Batch:</span><span>W15</span></body></html>"#;
/// let fields = extract_fields(html, &SiteConfig::default());
/// assert_eq!(fields.batch.as_deref(), Some("W15"));
/// ```
pub fn extract_fields(html: &str, site: &SiteConfig) -> ExtractedFields {
    extract_structured(html, site).merge(extract_fallback(html, site))
}

/// Extracts one page into a finalized record for `link`
pub fn extract_record(link: &str, html: &str, site: &SiteConfig) -> CompanyRecord {
    extract_fields(html, site).into_record(link)
}
