//! Plain-text rendering of one listing page, used by `--print`
use crate::{
    paging::{filter, total_pages, window},
    providers::{
        http::ListingTransport,
        s3::{ListingEntry, ListingError, S3Provider},
    },
    utils::{format_last_modified, format_size},
};

pub fn format_row(entry: &ListingEntry) -> String {
    let row = if entry.is_folder() {
        format!("{:<60} {:<20} {:>12}", format!("{}/", entry.name()), "", "")
    } else {
        format!(
            "{:<60} {:<20} {:>12}",
            entry.name(),
            format_last_modified(entry.last_modified),
            format_size(entry.size_bytes)
        )
    };
    row.trim_end().to_owned()
}

/// Rows of `page` after filtering by `query`, followed by a `Page X of Y` line
///
/// `page` is clamped into the range of existing pages.
pub fn page_report(
    entries: &[ListingEntry],
    query: &str,
    page: usize,
    page_size: usize,
) -> Vec<String> {
    let filtered = filter(entries, query);
    let page = page.clamp(1, total_pages(filtered.len(), page_size));
    let (visible, total) = window(&filtered, page, page_size);
    let mut lines: Vec<String> = visible.iter().map(|entry| format_row(entry)).collect();
    lines.push(format!("Page {} of {}", page, total));
    lines
}

/// Fetches `path` and renders the requested page of it
pub async fn listing_report<T: ListingTransport>(
    provider: &S3Provider<T>,
    path: &str,
    query: &str,
    page: usize,
    page_size: usize,
) -> Result<Vec<String>, ListingError> {
    let result = provider.fetch_all(path).await?;
    Ok(page_report(result.entries(), query, page, page_size))
}
