//! Unsigned S3 REST implementation of [`ObjectStore`].
//!
//! Requests go straight at the virtual-hosted endpoint
//! (`https://{bucket}.s3.{region}.amazonaws.com/`). No request signing:
//! the exercised objects are public, and credential handling is out of
//! scope here. Listing uses ListObjectsV2 with continuation tokens.

use std::borrow::Cow;

use async_trait::async_trait;
use bytes::Bytes;
use stockline_http::{HeaderMap, HeaderName, HeaderValue, HttpClient, Method, RequestOpts, StatusCode};

use crate::{normalize_key, ObjectStore, StoreError};

pub struct S3Store {
    http: HttpClient,
    bucket: String,
}

impl S3Store {
    /// Build a store for one bucket. An empty region code falls back to the
    /// global endpoint, which S3 redirects as needed.
    pub fn new(bucket: &str, region: &str) -> Result<Self, StoreError> {
        let endpoint = if region.is_empty() {
            format!("https://{bucket}.s3.amazonaws.com/")
        } else {
            format!("https://{bucket}.s3.{region}.amazonaws.com/")
        };
        let http = HttpClient::new(&endpoint)?;
        Ok(Self {
            http,
            bucket: bucket.to_string(),
        })
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.http = self.http.with_retries(n);
        self
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn fetch(&self, key: &str) -> Result<Bytes, StoreError> {
        let key = normalize_key(key);
        match self.http.get_bytes(&key, RequestOpts::default()).await {
            Ok(bytes) => Ok(bytes),
            Err(stockline_http::HttpError::Status { status, .. })
                if status == StatusCode::NOT_FOUND =>
            {
                Err(StoreError::NotFound(key))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let prefix = normalize_key(prefix);
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, Cow<'_, str>)> = vec![
                ("list-type", "2".into()),
                ("prefix", prefix.as_str().into()),
            ];
            if let Some(t) = &token {
                query.push(("continuation-token", t.as_str().into()));
            }

            let xml = self
                .http
                .get_text(
                    "",
                    RequestOpts {
                        query: Some(query),
                        ..Default::default()
                    },
                )
                .await?;

            let page = parse_list_page(&xml)?;
            tracing::debug!(
                bucket = %self.bucket,
                prefix = %prefix,
                page_keys = page.keys.len(),
                truncated = page.truncated,
                "store.list.page"
            );
            keys.extend(page.keys);

            match (page.truncated, page.next_token) {
                (true, Some(next)) => token = Some(next),
                _ => break,
            }
        }

        Ok(keys)
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            let key = normalize_key(key);
            self.http
                .send(Method::DELETE, &key, RequestOpts::default())
                .await?;
            tracing::info!(bucket = %self.bucket, key = %key, "store.delete");
        }
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<(), StoreError> {
        let src = normalize_key(src);
        let dst = normalize_key(dst);

        let source = format!("/{}/{}", self.bucket, src);
        let value = HeaderValue::from_str(&source)
            .map_err(|e| StoreError::CopySource(format!("{source}: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-amz-copy-source"), value);

        self.http
            .send(
                Method::PUT,
                &dst,
                RequestOpts {
                    headers: Some(headers),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(bucket = %self.bucket, src = %src, dst = %dst, "store.copy");
        Ok(())
    }
}

struct ListPage {
    keys: Vec<String>,
    next_token: Option<String>,
    truncated: bool,
}

/// Parse one ListObjectsV2 result page.
fn parse_list_page(xml: &str) -> Result<ListPage, StoreError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut page = ListPage {
        keys: Vec::new(),
        next_token: None,
        truncated: false,
    };
    let mut in_contents = false;
    let mut in_key = false;
    let mut in_token = false;
    let mut in_truncated = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                b"Contents" => in_contents = true,
                b"Key" if in_contents => in_key = true,
                b"NextContinuationToken" => in_token = true,
                b"IsTruncated" => in_truncated = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| StoreError::ListParse(e.to_string()))?;
                if in_key {
                    page.keys.push(text.to_string());
                } else if in_token {
                    page.next_token = Some(text.to_string());
                } else if in_truncated {
                    page.truncated = text.as_ref() == "true";
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                b"Contents" => in_contents = false,
                b"Key" => in_key = false,
                b"NextContinuationToken" => in_token = false,
                b"IsTruncated" => in_truncated = false,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(StoreError::ListParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_from_list_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>city-hive</Name>
  <Prefix>exports/</Prefix>
  <IsTruncated>false</IsTruncated>
  <Contents><Key>exports/2024/feed.csv</Key><Size>10</Size></Contents>
  <Contents><Key>exports/2024/manifest.json</Key><Size>2</Size></Contents>
</ListBucketResult>"#;

        let page = parse_list_page(xml).unwrap();
        assert_eq!(
            page.keys,
            vec!["exports/2024/feed.csv", "exports/2024/manifest.json"]
        );
        assert!(!page.truncated);
        assert!(page.next_token.is_none());
    }

    #[test]
    fn parses_continuation_token_when_truncated() {
        let xml = r#"<ListBucketResult>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>abc123</NextContinuationToken>
  <Contents><Key>a</Key></Contents>
</ListBucketResult>"#;

        let page = parse_list_page(xml).unwrap();
        assert_eq!(page.keys, vec!["a"]);
        assert!(page.truncated);
        assert_eq!(page.next_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn ignores_keys_outside_contents() {
        // CommonPrefixes and friends must not leak into the key list.
        let xml = r#"<ListBucketResult>
  <IsTruncated>false</IsTruncated>
  <Key>stray</Key>
  <Contents><Key>real</Key></Contents>
</ListBucketResult>"#;

        let page = parse_list_page(xml).unwrap();
        assert_eq!(page.keys, vec!["real"]);
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        assert!(parse_list_page("<ListBucketResult></Oops>").is_err());
    }
}
