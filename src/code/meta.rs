//! Fence meta string parsing.
//!
//! ```text
//! ```python title="example.py" {1,3-5} showLineNumbers
//!           ^^^^^^^^^^^^^^^^^^ ^^^^^^^^ ^^^^^^^^^^^^^^^
//!           key/value          ranges   bare flag
//! ```
//!
//! Values may be double-quoted, single-quoted or bare (up to whitespace).

use std::ops::RangeInclusive;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetaError {
    #[error("unterminated {quote} quote in value of `{key}`")]
    UnterminatedQuote { key: String, quote: char },

    #[error("unterminated `{{` line range")]
    UnterminatedRange,

    #[error("missing key before `=` at offset {0}")]
    MissingKey(usize),
}

/// Parsed meta directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    values: Vec<(String, String)>,
    flags: Vec<String>,
    ranges: Vec<RangeInclusive<usize>>,
}

impl Meta {
    pub fn parse(input: &str) -> Result<Self, MetaError> {
        let mut meta = Self::default();
        let bytes = input.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            let Some(ch) = input[i..].chars().next() else {
                break;
            };
            if ch.is_whitespace() {
                i += ch.len_utf8();
                continue;
            }

            if ch == '{' {
                let end = input[i..].find('}').ok_or(MetaError::UnterminatedRange)?;
                meta.ranges.extend(parse_ranges(&input[i + 1..i + end]));
                i += end + 1;
                continue;
            }

            if ch == '=' {
                return Err(MetaError::MissingKey(i));
            }

            let key_end = input[i..]
                .find(|ch: char| ch.is_whitespace() || ch == '=')
                .map_or(input.len(), |n| i + n);
            let key = &input[i..key_end];
            i = key_end;

            if bytes.get(i) != Some(&b'=') {
                meta.flags.push(key.to_string());
                continue;
            }
            i += 1;

            let value = match bytes.get(i) {
                Some(&q @ (b'"' | b'\'')) => {
                    let start = i + 1;
                    let len = input[start..].find(q as char).ok_or_else(|| MetaError::UnterminatedQuote {
                        key: key.to_string(),
                        quote: q as char,
                    })?;
                    i = start + len + 1;
                    &input[start..start + len]
                }
                _ => {
                    let end = input[i..].find(char::is_whitespace).map_or(input.len(), |n| i + n);
                    let value = &input[i..end];
                    i = end;
                    value
                }
            };
            meta.set(key, value);
        }

        Ok(meta)
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.values.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value.to_string(),
            None => self.values.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Line ranges from `{..}` groups, 1-based and inclusive.
    pub fn ranges(&self) -> &[RangeInclusive<usize>] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.flags.is_empty() && self.ranges.is_empty()
    }
}

/// Parse `1,3-5` into line ranges. Malformed or zero entries are skipped.
pub fn parse_ranges(input: &str) -> Vec<RangeInclusive<usize>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => (a.trim().parse().ok()?, b.trim().parse().ok()?),
                None => {
                    let n = part.parse().ok()?;
                    (n, n)
                }
            };
            (start >= 1 && start <= end).then_some(start..=end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_and_bare_values() {
        let meta = Meta::parse(r#"title="example.py" lang='py' tab=4"#).unwrap();
        assert_eq!(meta.get("title"), Some("example.py"));
        assert_eq!(meta.get("lang"), Some("py"));
        assert_eq!(meta.get("tab"), Some("4"));
        assert_eq!(meta.get("missing"), None);
    }

    #[test]
    fn test_quoted_value_keeps_spaces() {
        let meta = Meta::parse(r#"title="hello world.rs""#).unwrap();
        assert_eq!(meta.get("title"), Some("hello world.rs"));
    }

    #[test]
    fn test_flags_and_ranges() {
        let meta = Meta::parse("showLineNumbers {1,3-5} wrap").unwrap();
        assert!(meta.has_flag("showLineNumbers"));
        assert!(meta.has_flag("wrap"));
        assert_eq!(meta.ranges(), &[1..=1, 3..=5]);
    }

    #[test]
    fn test_empty_meta() {
        let meta = Meta::parse("   ").unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn test_unterminated_quote() {
        let err = Meta::parse(r#"title="example.py"#).unwrap_err();
        assert_eq!(
            err,
            MetaError::UnterminatedQuote {
                key: "title".into(),
                quote: '"'
            }
        );
    }

    #[test]
    fn test_unterminated_range() {
        assert_eq!(Meta::parse("{1,2").unwrap_err(), MetaError::UnterminatedRange);
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(Meta::parse("=x").unwrap_err(), MetaError::MissingKey(0));
    }

    #[test]
    fn test_parse_ranges_skips_malformed() {
        assert_eq!(parse_ranges("1, x, 4-2, 0, 2-3,,"), vec![1..=1, 2..=3]);
    }
}
