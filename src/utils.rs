use chrono::{DateTime, Local, Utc};

/// Returns the last segment of `key`, dropping the trailing '/' of folders
pub fn display_name(key: &str) -> &str {
    let key = key.strip_suffix('/').unwrap_or(key);
    key.rsplit('/').next().unwrap_or(key)
}

/// Prefix of the folder containing `path`, "" for top-level entries
pub fn parent_prefix(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

/// Turns user input like "/docs" into a listing prefix ("docs/")
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{}/", trimmed)
    }
}

/// Folder names along `path`, outermost first
///
/// The root ("Home") is not part of the result.
pub fn breadcrumbs(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Human readable size, in binary units with two decimals
pub fn format_size(size: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = match size {
        None => return String::from("Unknown"),
        Some(size) => size as f64,
    };
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

pub fn format_last_modified(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_dirs_and_trailing_slash() {
        assert_eq!(display_name("docs/readme.txt"), "readme.txt");
        assert_eq!(display_name("docs/images/"), "images");
        assert_eq!(display_name("top.txt"), "top.txt");
        assert_eq!(display_name("top/"), "top");
    }

    #[test]
    fn parent_prefix_goes_one_level_up() {
        assert_eq!(parent_prefix("docs/images/"), "docs/");
        assert_eq!(parent_prefix("docs/"), "");
        assert_eq!(parent_prefix(""), "");
        assert_eq!(parent_prefix("a/b/c.txt"), "a/b/");
    }

    #[test]
    fn prefixes_get_a_single_trailing_slash() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("docs"), "docs/");
        assert_eq!(normalize_prefix("/docs/images/"), "docs/images/");
    }

    #[test]
    fn breadcrumbs_list_every_segment() {
        assert_eq!(breadcrumbs(""), Vec::<&str>::new());
        assert_eq!(breadcrumbs("docs/images/2023/"), vec!["docs", "images", "2023"]);
        assert_eq!(breadcrumbs("docs/ sp /"), vec!["docs", " sp "]);
    }

    #[test]
    fn sizes_are_scaled_by_1024() {
        assert_eq!(format_size(None), "Unknown");
        assert_eq!(format_size(Some(0)), "0.00 B");
        assert_eq!(format_size(Some(1023)), "1023.00 B");
        assert_eq!(format_size(Some(2048)), "2.00 KB");
        assert_eq!(format_size(Some(1_572_864)), "1.50 MB");
        assert_eq!(format_size(Some(5 * 1024 * 1024 * 1024 * 1024 * 1024)), "5120.00 TB");
    }

    #[test]
    fn missing_date_is_blank() {
        assert_eq!(format_last_modified(None), "");
    }
}
