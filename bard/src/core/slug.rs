//! Slugs for heading identifiers and output file names.

use std::collections::HashMap;

/// Lower-case `text`, keep alphanumerics, turn whitespace, `-` and `_` into
/// single dashes, and drop everything else.
///
/// Returns an empty string when nothing survives.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }
    slug
}

/// File stem for a story title. Falls back to `story`.
pub fn title_stem(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "story".to_string()
    } else {
        slug
    }
}

/// Hands out unique heading ids within one document.
#[derive(Debug, Default)]
pub struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive an id from heading text; repeats get `-1`, `-2`, ...
    pub fn derive(&mut self, heading_text: &str) -> String {
        let base = match slugify(heading_text) {
            slug if slug.is_empty() => "heading".to_string(),
            slug => slug,
        };
        self.claim(base)
    }

    fn claim(&mut self, base: String) -> String {
        let Some(&last) = self.seen.get(&base) else {
            self.seen.insert(base.clone(), 0);
            return base;
        };
        let mut count = last;
        loop {
            count += 1;
            let candidate = format!("{base}-{count}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(base, count);
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("My AI Generated Story"), "my-ai-generated-story");
        assert_eq!(slugify("  The  Fall -- of_Rome! "), "the-fall-of-rome");
        assert_eq!(slugify("Café Noir"), "café-noir");
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn title_stem_falls_back_when_empty() {
        assert_eq!(title_stem("***"), "story");
        assert_eq!(title_stem("Night Train"), "night-train");
    }

    #[test]
    fn heading_ids_are_unique() {
        let mut ids = HeadingIds::new();
        assert_eq!(ids.derive("Chapter"), "chapter");
        assert_eq!(ids.derive("Chapter"), "chapter-1");
        assert_eq!(ids.derive("chapter"), "chapter-2");
        assert_eq!(ids.derive("!!!"), "heading");
    }

    #[test]
    fn numbered_suffix_skips_ids_taken_by_other_headings() {
        let mut ids = HeadingIds::new();
        assert_eq!(ids.derive("Intro"), "intro");
        assert_eq!(ids.derive("Intro 1"), "intro-1");
        assert_eq!(ids.derive("Intro"), "intro-2");
    }
}
