//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the fingerprinted stylesheet path.
///
/// The hash is computed at build time from the stylesheet content. Falls back
/// to the unhashed file when the build script could not read it.
///
/// Usage in templates: `{{ ""|stylesheet_path }}`
#[askama::filter_fn]
pub fn stylesheet_path(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(stylesheet_href(env!("STYLESHEET_HASH")))
}

fn stylesheet_href(hash: &str) -> String {
    if hash.is_empty() {
        "/static/css/main.css".to_string()
    } else {
        format!("/static/css/derived/main.{hash}.css")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_href() {
        assert_eq!(stylesheet_href(""), "/static/css/main.css");
        assert_eq!(
            stylesheet_href("deadbeef"),
            "/static/css/derived/main.deadbeef.css"
        );
    }
}
