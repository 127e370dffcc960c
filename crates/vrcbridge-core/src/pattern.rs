//! Segment-wise OSC address matching.
//!
//! Supported syntax: literal segments, `*` for exactly one segment, and `**`
//! for zero or more segments. Matching is purely structural; no character
//! classes or alternations.

use std::fmt;

use crate::errors::PatternError;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    AnyMany,
}

/// A parsed address pattern such as `/avatar/parameters/*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressPattern {
    source: String,
    segments: Vec<Segment>,
}

impl AddressPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| PatternError::NotAbsolute {
                pattern: pattern.to_owned(),
            })?;

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            let parsed = match segment {
                "" => {
                    return Err(PatternError::EmptySegment {
                        pattern: pattern.to_owned(),
                    });
                }
                "*" => Segment::Any,
                "**" => Segment::AnyMany,
                s if s.contains('*') => {
                    return Err(PatternError::PartialWildcard {
                        pattern: pattern.to_owned(),
                        segment: s.to_owned(),
                    });
                }
                s => Segment::Literal(s.to_owned()),
            };
            segments.push(parsed);
        }

        Ok(Self {
            source: pattern.to_owned(),
            segments,
        })
    }

    /// Whether `address` matches this pattern.
    pub fn matches(&self, address: &str) -> bool {
        let Some(rest) = address.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = rest.split('/').collect();
        match_segments(&self.segments, &parts)
    }

    /// Whether the pattern contains no wildcards.
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// The original pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn match_segments(pattern: &[Segment], parts: &[&str]) -> bool {
    match pattern.split_first() {
        None => parts.is_empty(),
        Some((Segment::AnyMany, rest)) => {
            (0..=parts.len()).any(|skip| match_segments(rest, &parts[skip..]))
        }
        Some((Segment::Any, rest)) => parts
            .split_first()
            .is_some_and(|(part, tail)| !part.is_empty() && match_segments(rest, tail)),
        Some((Segment::Literal(lit), rest)) => parts
            .split_first()
            .is_some_and(|(part, tail)| part == lit && match_segments(rest, tail)),
    }
}

impl fmt::Display for AddressPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
