// src/services/template.rs

//! Email template parsing and placeholder substitution.

use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::LaunchRecord;

/// Greeting used when a record has no maker name.
pub const FALLBACK_FIRST_NAME: &str = "there";

/// Subject and body ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// A parsed template file: first line subject, remainder body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

impl EmailTemplate {
    /// Split template text into subject and body.
    ///
    /// A `Subject:` prefix on the first line is dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
        let first = first.trim();
        let subject = first
            .strip_prefix("Subject:")
            .or_else(|| first.strip_prefix("subject:"))
            .unwrap_or(first)
            .trim();

        if subject.is_empty() {
            return Err(AppError::config("email template has an empty subject line"));
        }

        Ok(Self {
            subject: subject.to_string(),
            body: rest.trim_start_matches(['\r', '\n']).to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read template {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn render(&self, record: &LaunchRecord, platform: &str) -> RenderedEmail {
        RenderedEmail {
            subject: render(&self.subject, record, platform),
            body: render(&self.body, record, platform),
        }
    }
}

/// First whitespace-separated token of the maker name.
pub fn first_name(maker_name: &str) -> &str {
    maker_name
        .split_whitespace()
        .next()
        .unwrap_or(FALLBACK_FIRST_NAME)
}

/// Substitute `{{FirstName}}`, `{{ProductName}}` and `{{LaunchPlatform}}`.
///
/// Anything else between double braces is copied through unchanged.
pub fn render(template: &str, record: &LaunchRecord, platform: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match key.trim() {
            "FirstName" => out.push_str(first_name(&record.maker_name)),
            "ProductName" => out.push_str(&record.name),
            "LaunchPlatform" => out.push_str(platform),
            _ => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(maker: &str) -> LaunchRecord {
        let mut record = LaunchRecord::new("Widget", "https://www.producthunt.com/products/widget");
        record.maker_name = maker.to_string();
        record
    }

    #[test]
    fn renders_known_placeholders() {
        let out = render("Hi {{FirstName}}, re {{ProductName}}", &record("Jane Doe"), "PH");
        assert_eq!(out, "Hi Jane, re Widget");
    }

    #[test]
    fn unknown_placeholder_is_kept() {
        let out = render("{{Foo}} on {{LaunchPlatform}}", &record(""), "Product Hunt");
        assert_eq!(out, "{{Foo}} on Product Hunt");
    }

    #[test]
    fn missing_maker_falls_back() {
        let out = render("Hi {{FirstName}}", &record("   "), "PH");
        assert_eq!(out, "Hi there");
    }

    #[test]
    fn unterminated_braces_pass_through() {
        let out = render("Hi {{FirstName", &record("Jane"), "PH");
        assert_eq!(out, "Hi {{FirstName");
    }

    #[test]
    fn parse_splits_subject_and_body() {
        let template =
            EmailTemplate::parse("Subject: Congrats on {{ProductName}}\n\nHi {{FirstName}},\nNice launch.\n")
                .unwrap();
        assert_eq!(template.subject, "Congrats on {{ProductName}}");
        assert_eq!(template.body, "Hi {{FirstName}},\nNice launch.\n");

        let rendered = template.render(&record("Jane"), "PH");
        assert_eq!(rendered.subject, "Congrats on Widget");
        assert!(rendered.body.starts_with("Hi Jane,"));
    }

    #[test]
    fn parse_rejects_empty_subject() {
        assert!(EmailTemplate::parse("\nbody").is_err());
        assert!(EmailTemplate::parse("Subject:   \nbody").is_err());
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = EmailTemplate::load("/nonexistent/template.txt").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
