//! Module that defines view errors
use std::fmt::{self};

use crate::providers::s3::ListingError;

/// Error struct used in components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentError {
    component: String,
    code: String,
    message: String,
}

impl ComponentError {
    pub fn new(component: String, message: String, code: String) -> ComponentError {
        ComponentError {
            component,
            message,
            code,
        }
    }

    /// Maps a failed listing to a ComponentError
    ///
    /// * `err` - listing error to map
    /// * `path` - prefix whose listing failed
    pub fn from_listing(err: &ListingError, path: &str) -> ComponentError {
        let location = if path.is_empty() { "/" } else { path };
        ComponentError::new(
            String::from("S3"),
            format!("(Prefix: {}) {}", location, err),
            err.code(),
        )
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} Err: {} - {}",
            &self.component, &self.code, &self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ComponentError;
    use crate::providers::s3::ListingError;

    #[test]
    fn listing_errors_keep_code_and_prefix() {
        let err = ListingError::Network {
            status: Some(404),
            code: Some(String::from("NoSuchBucket")),
            message: String::from("The specified bucket does not exist"),
        };
        let component_err = ComponentError::from_listing(&err, "docs/");
        assert_eq!(component_err.component(), "S3");
        assert_eq!(component_err.code(), "NoSuchBucket");
        assert_eq!(
            component_err.message(),
            "(Prefix: docs/) Error fetching objects: The specified bucket does not exist"
        );

        let component_err =
            ComponentError::from_listing(&ListingError::Parse(String::from("bad xml")), "");
        assert_eq!(component_err.code(), "ParsingError");
        assert_eq!(
            component_err.to_string(),
            "S3 Err: ParsingError - (Prefix: /) Error parsing listing: bad xml"
        );
    }
}
