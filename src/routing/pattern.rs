//! Parsed route templates: `/customers/{id}` -> [Literal("customers"), Param("id")].

use crate::error::RouteError;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePattern {
    method: String,
    segments: Vec<Segment>,
}

/// Drop one leading `/` and split on `/`.
pub fn split_path(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

pub fn normalize_method(method: &str) -> String {
    method.trim().to_ascii_uppercase()
}

impl RoutePattern {
    pub fn parse(method: &str, template: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };
        let mut segments = Vec::new();
        for raw in split_path(template) {
            let segment = match raw.strip_prefix('{') {
                Some(rest) => {
                    let name = rest.strip_suffix('}').ok_or_else(|| invalid("unclosed parameter"))?;
                    if name.is_empty() {
                        return Err(invalid("empty parameter name"));
                    }
                    if name.contains(['{', '}']) {
                        return Err(invalid("stray brace"));
                    }
                    Segment::Param(name.to_string())
                }
                None if raw.contains(['{', '}']) => return Err(invalid("stray brace")),
                None => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }
        Ok(RoutePattern {
            method: normalize_method(method),
            segments,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn param_count(&self) -> usize {
        self.segments.iter().filter(|s| matches!(s, Segment::Param(_))).count()
    }

    pub fn is_exact(&self) -> bool {
        self.param_count() == 0
    }

    /// Literal path without the leading separator; only meaningful for exact patterns.
    pub fn literal_path(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.as_str(),
                Segment::Param(name) => name.as_str(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Method equal, same segment count, literals equal; parameters match any single non-empty segment.
    pub fn matches(&self, method: &str, segments: &[&str]) -> bool {
        self.method == method
            && self.segments.len() == segments.len()
            && self.segments.iter().zip(segments).all(|(pat, actual)| match pat {
                Segment::Literal(text) => text.as_str() == *actual,
                Segment::Param(_) => !actual.is_empty(),
            })
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.method)?;
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => write!(f, "/{}", text)?,
                Segment::Param(name) => write!(f, "/{{{}}}", name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literals_and_params() {
        let p = RoutePattern::parse("get", "/customers/{id}").unwrap();
        assert_eq!(p.method(), "GET");
        assert_eq!(
            p.segments(),
            &[Segment::Literal("customers".into()), Segment::Param("id".into())]
        );
        assert_eq!(p.param_count(), 1);
        assert!(!p.is_exact());
        assert_eq!(p.to_string(), "GET /customers/{id}");
    }

    #[test]
    fn literal_path_drops_leading_separator() {
        let p = RoutePattern::parse("POST", "/support-tickets").unwrap();
        assert!(p.is_exact());
        assert_eq!(p.literal_path(), "support-tickets");
    }

    #[test]
    fn rejects_bad_parameters() {
        for template in ["/a/{}", "/a/{id", "/a/id}", "/a/x{id}", "/a/{i{d}"] {
            assert!(
                matches!(RoutePattern::parse("GET", template), Err(RouteError::InvalidTemplate { .. })),
                "{} should be rejected",
                template
            );
        }
    }

    #[test]
    fn matching_compares_method_and_length() {
        let p = RoutePattern::parse("PUT", "/customers/{id}").unwrap();
        assert!(p.matches("PUT", &["customers", "7"]));
        assert!(!p.matches("GET", &["customers", "7"]));
        assert!(!p.matches("PUT", &["customers"]));
        assert!(!p.matches("PUT", &["customers", "7", "notes"]));
        assert!(!p.matches("PUT", &["tickets", "7"]));
        assert!(!p.matches("PUT", &["customers", ""]));
    }
}
