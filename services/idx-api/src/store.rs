//! Outbound access to the GFS object store.
//!
//! Two small capabilities cover everything the pipeline needs: listing a
//! cycle's object keys, and fetching whole objects or byte ranges of
//! objects. Both are traits so the resolver and orchestrator can be tested
//! against stubs without a network.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::{header, Client};
use tracing::debug;

use gfs_common::{GfsError, GfsResult};
use grib_idx::ByteRange;

/// Lists object keys for one cycle via the bucket's listing endpoint.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    async fn list_keys(&self, listing_url: &str) -> GfsResult<Vec<String>>;
}

/// Fetches remote objects, whole or by byte range.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// GET a small text object (the `.idx` sidecar).
    async fn fetch_text(&self, url: &str) -> GfsResult<String>;

    /// Ranged GET; returns the payload and its upstream content type.
    async fn fetch_range(
        &self,
        url: &str,
        range: ByteRange,
    ) -> GfsResult<(Bytes, Option<String>)>;
}

/// reqwest-backed implementation of both capabilities.
pub struct HttpObjectStore {
    client: Client,
}

impl HttpObjectStore {
    pub fn new(request_timeout: Duration) -> GfsResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GfsError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str, range: Option<&ByteRange>) -> GfsResult<reqwest::Response> {
        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header(header::RANGE, range.to_range_header());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GfsError::Transport(format!("GET {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(GfsError::Transport(format!(
                "GET {}: HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ObjectLister for HttpObjectStore {
    async fn list_keys(&self, listing_url: &str) -> GfsResult<Vec<String>> {
        debug!(url = %listing_url, "Listing objects");
        let response = self.get(listing_url, None).await?;
        let body = response
            .text()
            .await
            .map_err(|e| GfsError::Transport(format!("reading listing body: {}", e)))?;
        parse_listing_keys(&body)
    }
}

#[async_trait]
impl ObjectFetcher for HttpObjectStore {
    async fn fetch_text(&self, url: &str) -> GfsResult<String> {
        let response = self.get(url, None).await?;
        response
            .text()
            .await
            .map_err(|e| GfsError::Transport(format!("reading body of {}: {}", url, e)))
    }

    async fn fetch_range(
        &self,
        url: &str,
        range: ByteRange,
    ) -> GfsResult<(Bytes, Option<String>)> {
        debug!(url = %url, range = %range.to_range_header(), "Ranged fetch");
        let response = self.get(url, Some(&range)).await?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| GfsError::Transport(format!("reading body of {}: {}", url, e)))?;
        Ok((body, content_type))
    }
}

/// Extract `<Key>` values from an S3 `ListBucketResult` document.
///
/// The document sits in the `http://s3.amazonaws.com/doc/2006-03-01/`
/// namespace; matching on local names keeps the scan prefix-agnostic.
pub fn parse_listing_keys(xml: &str) -> GfsResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut keys = Vec::new();
    let mut in_key = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"Key" => in_key = true,
            Ok(Event::Text(t)) if in_key => {
                let text = t
                    .unescape()
                    .map_err(|e| GfsError::Transport(format!("bad listing XML: {}", e)))?;
                keys.push(text.into_owned());
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Key" => in_key = false,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(GfsError::Transport(format!("bad listing XML: {}", e))),
        }
        buf.clear();
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_keys() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>noaa-gfs-bdp-pds</Name>
  <Prefix>gfs.20230408/06/atmos/gfs.t06z.pgrb2.0p25</Prefix>
  <KeyCount>3</KeyCount>
  <Contents>
    <Key>gfs.20230408/06/atmos/gfs.t06z.pgrb2.0p25.anl</Key>
    <Size>44</Size>
  </Contents>
  <Contents>
    <Key>gfs.20230408/06/atmos/gfs.t06z.pgrb2.0p25.f000</Key>
    <Size>527</Size>
  </Contents>
  <Contents>
    <Key>gfs.20230408/06/atmos/gfs.t06z.pgrb2.0p25.f000.idx</Key>
    <Size>12</Size>
  </Contents>
</ListBucketResult>"#;

        let keys = parse_listing_keys(xml).unwrap();
        assert_eq!(
            keys,
            vec![
                "gfs.20230408/06/atmos/gfs.t06z.pgrb2.0p25.anl",
                "gfs.20230408/06/atmos/gfs.t06z.pgrb2.0p25.f000",
                "gfs.20230408/06/atmos/gfs.t06z.pgrb2.0p25.f000.idx",
            ]
        );
    }

    #[test]
    fn test_parse_listing_keys_empty_result() {
        let xml = r#"<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <KeyCount>0</KeyCount>
</ListBucketResult>"#;
        assert!(parse_listing_keys(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_listing_rejects_mismatched_tags() {
        let xml = "<ListBucketResult><Contents><Key>gfs.20230408</Wrong></Contents></ListBucketResult>";
        assert!(parse_listing_keys(xml).is_err());
    }
}
