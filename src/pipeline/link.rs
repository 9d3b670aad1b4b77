//! Link resolution: pull the file identifier out of a sharing URL.
//!
//! Drive hands out links in two shapes:
//!
//! ```text
//! https://drive.google.com/file/d/<ID>/view?usp=sharing     (path form)
//! https://drive.google.com/open?id=<ID>                     (query form)
//! ```
//!
//! The path form is tried first; the first pattern that matches wins. This is
//! a pure string transformation, so a rejected link never reaches the network.

use crate::error::InvalidLinkError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::debug;

static PATH_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap());
static QUERY_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap());

/// Opaque identifier of a file on the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the [`FileId`] from a user-supplied sharing link.
pub fn resolve_file_id(reference: &str) -> Result<FileId, InvalidLinkError> {
    let reference = reference.trim();

    let captured = PATH_ID
        .captures(reference)
        .or_else(|| QUERY_ID.captures(reference))
        .and_then(|caps| caps.get(1));

    match captured {
        Some(m) => {
            debug!("Resolved file id {} from {}", m.as_str(), reference);
            Ok(FileId(m.as_str().to_string()))
        }
        None => Err(InvalidLinkError {
            input: reference.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_form_yields_exact_id() {
        let id = resolve_file_id("https://drive.google.com/file/d/ABC123/view").unwrap();
        assert_eq!(id.as_str(), "ABC123");

        let id = resolve_file_id(
            "https://drive.google.com/file/d/1a-B_c2D3e/view?usp=sharing",
        )
        .unwrap();
        assert_eq!(id.as_str(), "1a-B_c2D3e");
    }

    #[test]
    fn query_form_yields_exact_id() {
        let id = resolve_file_id("https://drive.google.com/open?id=XYZ_789").unwrap();
        assert_eq!(id.as_str(), "XYZ_789");

        let id = resolve_file_id("https://drive.google.com/uc?export=download&id=q-1").unwrap();
        assert_eq!(id.as_str(), "q-1");
    }

    #[test]
    fn path_form_wins_over_query_form() {
        let id = resolve_file_id("https://drive.google.com/file/d/PATHID/view?id=QUERYID").unwrap();
        assert_eq!(id.as_str(), "PATHID");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let id = resolve_file_id("  https://drive.google.com/file/d/ABC/view \n").unwrap();
        assert_eq!(id.to_string(), "ABC");
    }

    #[test]
    fn unrecognised_links_are_rejected() {
        for bad in [
            "",
            "not a url",
            "https://drive.google.com/drive/folders",
            "https://example.com/file/d/",
            "https://example.com/?uid=abc",
        ] {
            let err = resolve_file_id(bad).unwrap_err();
            assert_eq!(err.input, bad.trim());
        }
    }
}
