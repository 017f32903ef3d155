//! Heading slug generation.
//!
//! Follows the GitHub anchor convention: lowercase, punctuation removed,
//! whitespace turned into `-`, with numeric suffixes for repeats.

use rustc_hash::FxHashMap;

use crate::config::SlugMode;

/// Slugify a single piece of text (no collision tracking).
pub fn slugify(text: &str, mode: SlugMode) -> String {
    let text = match mode {
        SlugMode::Safe => text.to_string(),
        SlugMode::Ascii => deunicode::deunicode(text),
    };

    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Stateful slugger for one document.
///
/// Remembers every slug it has handed out (or been told about) and
/// disambiguates repeats as `intro`, `intro-1`, `intro-2`, ...
#[derive(Debug, Default)]
pub struct Slugger {
    mode: SlugMode,
    seen: FxHashMap<String, usize>,
}

impl Slugger {
    pub fn new(mode: SlugMode) -> Self {
        Self {
            mode,
            seen: FxHashMap::default(),
        }
    }

    /// Reserve an id that already exists in the document.
    pub fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }

    /// Produce a unique slug for `text`. Returns `None` for an empty slug.
    pub fn slug(&mut self, text: &str) -> Option<String> {
        let base = slugify(text, self.mode);
        if base.is_empty() {
            return None;
        }

        let Some(count) = self.seen.get(&base).copied() else {
            self.seen.insert(base.clone(), 0);
            return Some(base);
        };

        let mut n = count + 1;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(base, n);
                self.seen.insert(candidate.clone(), 0);
                return Some(candidate);
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World", SlugMode::Safe), "hello-world");
        assert_eq!(slugify("  What's new?  ", SlugMode::Safe), "whats-new");
        assert_eq!(slugify("snake_case-ok", SlugMode::Safe), "snake_case-ok");
    }

    #[test]
    fn test_slugify_unicode_modes() {
        assert_eq!(slugify("Café Crème", SlugMode::Safe), "café-crème");
        assert_eq!(slugify("Café Crème", SlugMode::Ascii), "cafe-creme");
        assert_eq!(slugify("你好", SlugMode::Safe), "你好");
    }

    #[test]
    fn test_slugger_dedup() {
        let mut slugger = Slugger::new(SlugMode::Safe);
        assert_eq!(slugger.slug("Intro").as_deref(), Some("intro"));
        assert_eq!(slugger.slug("Intro").as_deref(), Some("intro-1"));
        assert_eq!(slugger.slug("Intro").as_deref(), Some("intro-2"));
    }

    #[test]
    fn test_slugger_respects_reserved() {
        let mut slugger = Slugger::new(SlugMode::Safe);
        slugger.reserve("setup");
        slugger.reserve("setup-1");
        assert_eq!(slugger.slug("Setup").as_deref(), Some("setup-2"));
    }

    #[test]
    fn test_slugger_empty() {
        let mut slugger = Slugger::new(SlugMode::Safe);
        assert_eq!(slugger.slug("?!"), None);
    }
}
