//! Static configuration of the bucket being browsed
use std::collections::BTreeSet;

use thiserror::Error;

pub const DEFAULT_DOMAIN: &str = "s3.amazonaws.com";
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Upper bound of keys requested per listing page
pub const MAX_KEYS: u32 = 1000;
/// Files of the hosted listing page itself, hidden from the bucket root
pub const SITE_ASSET_KEYS: [&str; 4] = ["index.html", "s3.js", "dark-mode.css", "config.js"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please provide the name of the bucket you want to browse")]
    MissingBucketName,
    #[error("Page size has to be at least 1")]
    InvalidPageSize,
    #[error("Unsupported scheme {0:?}, expected \"http\" or \"https\"")]
    InvalidScheme(String),
}

#[derive(Debug, Clone)]
pub struct BucketConfig {
    pub bucket_name: String,
    pub domain: String,
    pub scheme: String,
    pub excluded_keys: BTreeSet<String>,
    pub page_size: usize,
}

impl BucketConfig {
    pub fn new(bucket_name: &str, domain: &str) -> BucketConfig {
        BucketConfig {
            bucket_name: bucket_name.to_owned(),
            domain: domain.to_owned(),
            scheme: String::from("https"),
            excluded_keys: SITE_ASSET_KEYS.iter().map(|k| k.to_string()).collect(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_scheme(mut self, scheme: &str) -> BucketConfig {
        self.scheme = scheme.to_owned();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> BucketConfig {
        self.page_size = page_size;
        self
    }

    /// Replaces the excluded keys; `keep_site_assets` keeps the defaults on top
    pub fn with_excluded_keys<I>(mut self, keys: I, keep_site_assets: bool) -> BucketConfig
    where
        I: IntoIterator<Item = String>,
    {
        if !keep_site_assets {
            self.excluded_keys.clear();
        }
        self.excluded_keys.extend(keys);
        self
    }

    pub fn validate(self) -> Result<BucketConfig, ConfigError> {
        if self.bucket_name.trim().is_empty() {
            return Err(ConfigError::MissingBucketName);
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(ConfigError::InvalidScheme(self.scheme));
        }
        Ok(self)
    }

    /// Virtual-hosted style endpoint of the bucket, without a trailing '/'
    pub fn endpoint(&self) -> String {
        format!("{}://{}.{}", self.scheme, self.bucket_name, self.domain)
    }

    /// Direct download URL of an object
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint(), urlencoding::encode(key))
    }
}

#[cfg(test)]
mod tests {
    use super::{BucketConfig, ConfigError, DEFAULT_DOMAIN};

    #[test]
    fn defaults_hide_site_assets() {
        let config = BucketConfig::new("public-data", DEFAULT_DOMAIN);
        assert_eq!(config.page_size, 10);
        assert!(config.excluded_keys.contains("index.html"));
        assert!(config.excluded_keys.contains("s3.js"));
        assert!(config.excluded_keys.contains("dark-mode.css"));
        assert!(config.excluded_keys.contains("config.js"));
    }

    #[test]
    fn excluded_keys_can_replace_defaults() {
        let config = BucketConfig::new("public-data", DEFAULT_DOMAIN)
            .with_excluded_keys(vec![String::from("robots.txt")], false);
        assert_eq!(config.excluded_keys.len(), 1);
        assert!(config.excluded_keys.contains("robots.txt"));

        let config = BucketConfig::new("public-data", DEFAULT_DOMAIN)
            .with_excluded_keys(vec![String::from("robots.txt")], true);
        assert_eq!(config.excluded_keys.len(), 5);
    }

    #[test]
    fn object_url_encodes_the_whole_key() {
        let config = BucketConfig::new("public-data", DEFAULT_DOMAIN);
        assert_eq!(
            config.object_url("reports/Q1 2023.pdf"),
            "https://public-data.s3.amazonaws.com/reports%2FQ1%202023.pdf"
        );
        let config = config.with_scheme("http");
        assert_eq!(config.endpoint(), "http://public-data.s3.amazonaws.com");
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert_eq!(
            BucketConfig::new(" ", DEFAULT_DOMAIN).validate().unwrap_err(),
            ConfigError::MissingBucketName
        );
        assert_eq!(
            BucketConfig::new("b", DEFAULT_DOMAIN)
                .with_page_size(0)
                .validate()
                .unwrap_err(),
            ConfigError::InvalidPageSize
        );
        assert_eq!(
            BucketConfig::new("b", DEFAULT_DOMAIN)
                .with_scheme("ftp")
                .validate()
                .unwrap_err(),
            ConfigError::InvalidScheme(String::from("ftp"))
        );
        assert!(BucketConfig::new("b", DEFAULT_DOMAIN).validate().is_ok());
    }
}
