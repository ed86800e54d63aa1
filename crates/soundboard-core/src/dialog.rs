//! Dialog templates — named sets of interchangeable spoken lines.
//!
//! A `.dialog` file holds one line per variant; blank lines and `#` comments
//! are ignored. Rendering picks one variant at random.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

/// All dialog templates known to a skill.
#[derive(Debug, Clone, Default)]
pub struct DialogSet {
    templates: HashMap<String, Vec<String>>,
}

impl DialogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a template from the contents of a `.dialog` file.
    pub fn insert(&mut self, name: &str, contents: &str) {
        let lines = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        self.templates.insert(name.to_string(), lines);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Pick a line for `name`. Unknown or empty templates speak the template
    /// name itself, underscores read as spaces.
    pub fn render<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> String {
        self.templates
            .get(name)
            .and_then(|lines| lines.choose(rng))
            .cloned()
            .unwrap_or_else(|| name.replace('_', " "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn render_single_line() {
        let mut set = DialogSet::new();
        set.insert("apologise", "Sorry, that was me.\n");
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(set.render("apologise", &mut rng), "Sorry, that was me.");
    }

    #[test]
    fn render_picks_from_variants() {
        let mut set = DialogSet::new();
        set.insert("noise", "oops\nexcuse me\npardon me\n");
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let line = set.render("noise", &mut rng);
            assert!(["oops", "excuse me", "pardon me"].contains(&line.as_str()), "{line}");
        }
    }

    #[test]
    fn insert_skips_comments_and_blanks() {
        let mut set = DialogSet::new();
        set.insert("cancel", "# spoken on halt\n\n  okay, I'll stop  \n");
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(set.render("cancel", &mut rng), "okay, I'll stop");
    }

    #[test]
    fn unknown_template_speaks_its_name() {
        let set = DialogSet::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(set.render("not_found", &mut rng), "not found");
    }

    #[test]
    fn empty_template_speaks_its_name() {
        let mut set = DialogSet::new();
        set.insert("blank", "# nothing here\n");
        assert_eq!(set.len(), 1);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(set.render("blank", &mut rng), "blank");
    }
}
