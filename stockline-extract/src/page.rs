//! Locates the storage parameters embedded in the entry page.
//!
//! The page carries three marked elements: `#bucket-value` (bucket name in
//! its text), `#region-value` (region code in a `data-region` attribute),
//! and `#object-value`, whose `<span>` children spell out the object key as
//! alternating `path` / `path-sep` nodes.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::path::{reconstruct_path, InlineNode, NodeRole};
use crate::ExtractError;

/// Storage parameters recovered from the entry page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDetails {
    pub bucket: String,
    pub region_code: String,
    pub object_path: String,
}

/// Extract [`ObjectDetails`] from a fully-buffered entry document.
///
/// Errors with [`ExtractError::MissingRequiredField`] when any of the three
/// marked elements is absent. A present `#region-value` without a
/// `data-region` attribute yields an empty region code rather than an error.
pub fn extract_object_details(html: &str) -> Result<ObjectDetails, ExtractError> {
    let doc = Html::parse_document(html);

    let bucket_el = select_one(&doc, "#bucket-value")
        .ok_or(ExtractError::MissingRequiredField("bucket-value"))?;
    let region_el = select_one(&doc, "#region-value")
        .ok_or(ExtractError::MissingRequiredField("region-value"))?;
    let container = select_one(&doc, "#object-value")
        .ok_or(ExtractError::MissingRequiredField("object-value"))?;

    let bucket = element_text(&bucket_el).trim().to_string();
    let region_code = region_el
        .value()
        .attr("data-region")
        .unwrap_or_default()
        .to_string();

    let span_sel = Selector::parse("span").unwrap();
    let nodes: Vec<InlineNode> = container.select(&span_sel).map(classify_span).collect();
    let object_path = reconstruct_path(&nodes);

    tracing::debug!(
        bucket = %bucket,
        region = %region_code,
        object_path = %object_path,
        span_count = nodes.len(),
        "extract.object_details"
    );

    Ok(ObjectDetails {
        bucket,
        region_code,
        object_path,
    })
}

fn select_one<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).unwrap();
    doc.select(&sel).next()
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

/// Classify one span by its class list. `path-sep` wins over `path` when an
/// element carries both, matching how the entry pages have always been read.
fn classify_span(el: ElementRef<'_>) -> InlineNode {
    let role = if has_class(&el, "path-sep") {
        NodeRole::Separator
    } else if has_class(&el, "path") {
        NodeRole::Segment
    } else {
        NodeRole::Other
    };
    InlineNode {
        role,
        text: element_text(&el),
    }
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_page(object_spans: &str) -> String {
        format!(
            r#"<html><body>
            <div id="bucket-value"> city-hive-inventory </div>
            <div id="region-value" data-region="us-east-1">US East</div>
            <div id="object-value">{object_spans}</div>
            </body></html>"#
        )
    }

    #[test]
    fn extracts_all_three_fields() {
        let html = entry_page(
            r#"<span class="path">exports</span><span class="path-sep">/</span><span class="path">inventory.csv</span>"#,
        );
        let details = extract_object_details(&html).unwrap();
        assert_eq!(details.bucket, "city-hive-inventory");
        assert_eq!(details.region_code, "us-east-1");
        assert_eq!(details.object_path, "exports/inventory.csv");
    }

    #[test]
    fn empty_separator_span_falls_back_to_slash() {
        let html = entry_page(
            r#"<span class="path">exports</span><span class="path-sep"></span><span class="path">feed.csv</span>"#,
        );
        let details = extract_object_details(&html).unwrap();
        assert_eq!(details.object_path, "exports/feed.csv");
    }

    #[test]
    fn unclassified_spans_are_transparent_for_output() {
        let html = entry_page(
            r#"<span class="decoration">»</span><span class="path-sep">/</span><span class="path">feed.csv</span>"#,
        );
        let details = extract_object_details(&html).unwrap();
        assert_eq!(details.object_path, "/feed.csv");
    }

    #[test]
    fn separator_class_wins_when_both_classes_present() {
        let html = entry_page(
            r#"<span class="path">a</span><span class="path path-sep">/</span><span class="path">b</span>"#,
        );
        let details = extract_object_details(&html).unwrap();
        assert_eq!(details.object_path, "a/b");
    }

    #[test]
    fn missing_bucket_is_reported() {
        let html = r#"<html><body>
            <div id="region-value" data-region="us-east-1"></div>
            <div id="object-value"></div>
            </body></html>"#;
        let err = extract_object_details(html).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingRequiredField("bucket-value")
        ));
    }

    #[test]
    fn missing_object_container_is_reported() {
        let html = r#"<html><body>
            <div id="bucket-value">b</div>
            <div id="region-value" data-region="eu-west-1"></div>
            </body></html>"#;
        let err = extract_object_details(html).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingRequiredField("object-value")
        ));
    }

    #[test]
    fn region_without_attribute_yields_empty_code() {
        let html = r#"<html><body>
            <div id="bucket-value">b</div>
            <div id="region-value">US East</div>
            <div id="object-value"><span class="path">k</span></div>
            </body></html>"#;
        let details = extract_object_details(html).unwrap();
        assert_eq!(details.region_code, "");
        assert_eq!(details.object_path, "k");
    }
}
