use std::{collections::BTreeSet, mem};

use chrono::{DateTime, Utc};
use futures::{stream, Stream, TryStreamExt};
use quick_xml::{events::Event, Reader};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    http::{ListRequest, ListingTransport},
    Kind,
};
use crate::utils::display_name;

/// Reasons a listing can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// Non-success response or transport failure
    #[error("Error fetching objects: {message}")]
    Network {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },
    /// Body is not a well-formed `ListBucketResult`
    #[error("Error parsing listing: {0}")]
    Parse(String),
}

impl ListingError {
    pub fn transport(err: reqwest::Error) -> ListingError {
        ListingError::Network {
            status: err.status().map(|s| s.as_u16()),
            code: None,
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> String {
        match self {
            ListingError::Network {
                code: Some(code), ..
            } => code.to_owned(),
            ListingError::Network {
                status: Some(status),
                ..
            } => format!("HTTP {}", status),
            ListingError::Network { .. } => String::from("Request Error"),
            ListingError::Parse(_) => String::from("ParsingError"),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ListingError::Network { message, .. } => message,
            ListingError::Parse(message) => message,
        }
    }
}

/// One row of a listing, either a common prefix or a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub key: String,
    pub kind: Kind,
    pub last_modified: Option<DateTime<Utc>>,
    pub size_bytes: Option<u64>,
}

impl ListingEntry {
    pub fn folder(key: &str) -> ListingEntry {
        ListingEntry {
            key: key.to_owned(),
            kind: Kind::Folder,
            last_modified: None,
            size_bytes: None,
        }
    }

    pub fn object(
        key: &str,
        last_modified: Option<DateTime<Utc>>,
        size_bytes: Option<u64>,
    ) -> ListingEntry {
        ListingEntry {
            key: key.to_owned(),
            kind: Kind::Object,
            last_modified,
            size_bytes,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == Kind::Folder
    }

    /// Last path segment, without the trailing '/' of folders
    pub fn name(&self) -> &str {
        display_name(&self.key)
    }
}

/// A single upstream response, folders first, then objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub entries: Vec<ListingEntry>,
    pub is_truncated: bool,
    pub continuation_token: Option<String>,
}

/// All entries of one navigation, in fetch order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingResult {
    path: String,
    entries: Vec<ListingEntry>,
}

impl ListingResult {
    pub fn new(path: &str, entries: Vec<ListingEntry>) -> ListingResult {
        ListingResult {
            path: path.to_owned(),
            entries,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
struct RawContents {
    key: Option<String>,
    last_modified: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Default)]
struct RawListing {
    is_truncated: Option<String>,
    next_continuation_token: Option<String>,
    contents: Vec<RawContents>,
    common_prefixes: Vec<String>,
}

fn xml_error(err: quick_xml::Error) -> ListingError {
    ListingError::Parse(err.to_string())
}

/// Collects the fields of a `ListBucketResult` document
///
/// Text is kept verbatim, keys may start or end with whitespace.
fn read_listing(body: &str) -> Result<RawListing, ListingError> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(false).expand_empty_elements(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut listing = RawListing::default();
    let mut contents = RawContents::default();
    let mut prefix: Option<String> = None;

    loop {
        match reader.read_event(&mut buf).map_err(xml_error)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name()).into_owned();
                if path.is_empty() && name != "ListBucketResult" {
                    return Err(ListingError::Parse(format!(
                        "Unexpected root element {:?}",
                        name
                    )));
                }
                path.push(name);
                text.clear();
            }
            Event::Text(e) => text.push_str(&e.unescape_and_decode(&reader).map_err(xml_error)?),
            Event::CData(e) => text.push_str(
                std::str::from_utf8(&e).map_err(|e| ListingError::Parse(e.to_string()))?,
            ),
            Event::End(_) => {
                let names: Vec<&str> = path.iter().map(String::as_str).collect();
                match names.as_slice() {
                    [_, "IsTruncated"] => listing.is_truncated = Some(mem::take(&mut text)),
                    [_, "NextContinuationToken"] => {
                        listing.next_continuation_token = Some(mem::take(&mut text))
                    }
                    [_, "Contents", "Key"] => contents.key = Some(mem::take(&mut text)),
                    [_, "Contents", "LastModified"] => {
                        contents.last_modified = Some(mem::take(&mut text))
                    }
                    [_, "Contents", "Size"] => contents.size = Some(mem::take(&mut text)),
                    [_, "Contents"] => listing.contents.push(mem::take(&mut contents)),
                    [_, "CommonPrefixes", "Prefix"] => prefix = Some(mem::take(&mut text)),
                    [_, "CommonPrefixes"] => match prefix.take() {
                        Some(prefix) => listing.common_prefixes.push(prefix),
                        None => {
                            return Err(ListingError::Parse(String::from(
                                "Common prefix without a Prefix",
                            )))
                        }
                    },
                    _ => (),
                }
                path.pop();
            }
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    if !path.is_empty() {
        return Err(ListingError::Parse(String::from("Unexpected end of document")));
    }
    Ok(listing)
}

/// Parses a raw `ListBucketResult` body into a page
///
/// Entries are returned unfiltered; it's up to the caller to drop
/// self-references and excluded keys.
pub fn parse_listing_page(body: &[u8]) -> Result<ListingPage, ListingError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| ListingError::Parse(format!("Response is not valid UTF-8: {}", e)))?;
    let result = read_listing(text)?;

    let is_truncated = match result.is_truncated.as_deref().map(str::trim) {
        Some("true") => true,
        Some("false") => false,
        Some(other) => {
            return Err(ListingError::Parse(format!(
                "Unexpected IsTruncated value: {:?}",
                other
            )))
        }
        None => return Err(ListingError::Parse(String::from("Missing IsTruncated"))),
    };
    let continuation_token = match (is_truncated, result.next_continuation_token) {
        (true, Some(token)) if !token.is_empty() => Some(token),
        (true, _) => {
            return Err(ListingError::Parse(String::from(
                "Truncated listing without a continuation token",
            )))
        }
        (false, _) => None,
    };

    let mut entries = Vec::with_capacity(result.common_prefixes.len() + result.contents.len());
    for common_prefix in result.common_prefixes {
        if !common_prefix.ends_with('/') {
            return Err(ListingError::Parse(format!(
                "Common prefix {:?} doesn't end with '/'",
                common_prefix
            )));
        }
        entries.push(ListingEntry::folder(&common_prefix));
    }
    for object in result.contents {
        let key = object
            .key
            .ok_or_else(|| ListingError::Parse(String::from("Contents without a Key")))?;
        let last_modified = match object.last_modified {
            None => None,
            Some(date) => Some(
                DateTime::parse_from_rfc3339(date.trim())
                    .map_err(|e| {
                        ListingError::Parse(format!(
                            "Couldn't parse last modification date of {:?}: {}",
                            key, e
                        ))
                    })?
                    .with_timezone(&Utc),
            ),
        };
        let size_bytes = object.size.and_then(|s| s.trim().parse::<u64>().ok());
        entries.push(ListingEntry {
            key,
            kind: Kind::Object,
            last_modified,
            size_bytes,
        });
    }

    Ok(ListingPage {
        entries,
        is_truncated,
        continuation_token,
    })
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Read-only view of a bucket reachable through a listing transport
pub struct S3Provider<T> {
    pub bucket_name: String,
    transport: T,
    excluded_keys: BTreeSet<String>,
}

impl<T: ListingTransport> S3Provider<T> {
    pub fn new(bucket_name: &str, transport: T, excluded_keys: BTreeSet<String>) -> S3Provider<T> {
        S3Provider {
            bucket_name: bucket_name.to_owned(),
            transport,
            excluded_keys,
        }
    }

    /// Whether a parsed entry belongs in the listing of `path`
    fn admits(&self, path: &str, entry: &ListingEntry) -> bool {
        if entry.key == path {
            return false;
        }
        match entry.kind {
            Kind::Folder => true,
            // Folder placeholder objects don't get rows of their own
            Kind::Object => !entry.key.ends_with('/') && !self.excluded_keys.contains(&entry.key),
        }
    }

    async fn fetch_page(
        &self,
        path: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, ListingError> {
        let request = ListRequest::new(path, continuation_token);
        let body = self.transport.list(&request).await?;
        let mut page = parse_listing_page(&body)?;
        page.entries.retain(|entry| self.admits(path, entry));
        debug!(
            path,
            entries = page.entries.len(),
            truncated = page.is_truncated,
            "fetched listing page"
        );
        Ok(page)
    }

    /// Lazily walks the listing of `path`, one upstream page at a time
    ///
    /// Every page after the first is requested with the continuation token of
    /// the previous one. The stream ends after the first non-truncated page,
    /// or right after yielding an error.
    pub fn pages<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Stream<Item = Result<ListingPage, ListingError>> + 'a {
        stream::try_unfold(Cursor::Start, move |cursor| self.advance(path, cursor))
    }

    async fn advance(
        &self,
        path: &str,
        cursor: Cursor,
    ) -> Result<Option<(ListingPage, Cursor)>, ListingError> {
        let token = match cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
        };
        let page = self.fetch_page(path, token.as_deref()).await?;
        let next = match &page.continuation_token {
            Some(token) => Cursor::Next(token.clone()),
            None => Cursor::Done,
        };
        Ok(Some((page, next)))
    }

    /// Fetches every page of `path` and concatenates their entries
    ///
    /// A failure on any page discards whatever was fetched before it.
    pub async fn fetch_all(&self, path: &str) -> Result<ListingResult, ListingError> {
        let mut pages = 0usize;
        let entries = self
            .pages(path)
            .try_fold(Vec::new(), |mut entries, page| {
                pages += 1;
                entries.extend(page.entries);
                futures::future::ready(Ok(entries))
            })
            .await
            .map_err(|e| {
                warn!(path, error = %e, "listing failed");
                e
            })?;
        info!(path, pages, entries = entries.len(), "listing complete");
        Ok(ListingResult::new(path, entries))
    }
}
