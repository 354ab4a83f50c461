//! Entry URL normalisation.
//!
//! The entry page link is published as a Bitbucket *source view* URL
//! (`/{owner}/{repo}/src/{rev}/...`), which serves an HTML wrapper around
//! the file. Fetching must hit the *raw* endpoint instead, so the `src`
//! path segment is swapped for `raw` before the request goes out.

use url::Url;

use crate::ExtractError;

/// Rewrite a Bitbucket source-view URL to its raw equivalent.
///
/// Non-Bitbucket URLs and URLs without a `src` segment in the expected
/// position pass through unchanged.
pub fn to_raw_url(entry_url: &str) -> Result<String, ExtractError> {
    let mut url =
        Url::parse(entry_url).map_err(|e| ExtractError::EntryUrl(e.to_string()))?;

    let is_bitbucket = url
        .host_str()
        .is_some_and(|h| h == "bitbucket.org" || h.ends_with(".bitbucket.org"));
    if !is_bitbucket {
        return Ok(url.into());
    }

    let segments: Vec<String> = match url.path_segments() {
        Some(segs) => segs.map(str::to_string).collect(),
        None => return Ok(url.into()),
    };

    // Expected shape: /{owner}/{repo}/src/{rev}/{path...}
    if segments.len() > 2 && segments[2] == "src" {
        let mut rewritten = segments;
        rewritten[2] = "raw".to_string();
        url.set_path(&rewritten.join("/"));
    }

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_src_to_raw() {
        let src = "https://bitbucket.org/cityhive/jobs/src/master/integration-eng/integration-entryfile.html";
        let raw = to_raw_url(src).unwrap();
        assert_eq!(
            raw,
            "https://bitbucket.org/cityhive/jobs/raw/master/integration-eng/integration-entryfile.html"
        );
    }

    #[test]
    fn leaves_raw_urls_alone() {
        let raw = "https://bitbucket.org/cityhive/jobs/raw/master/file.html";
        assert_eq!(to_raw_url(raw).unwrap(), raw);
    }

    #[test]
    fn leaves_other_hosts_alone() {
        let other = "https://example.com/cityhive/jobs/src/master/file.html";
        assert_eq!(to_raw_url(other).unwrap(), other);
    }

    #[test]
    fn rejects_unparseable_urls() {
        assert!(matches!(
            to_raw_url("not a url"),
            Err(ExtractError::EntryUrl(_))
        ));
    }
}
