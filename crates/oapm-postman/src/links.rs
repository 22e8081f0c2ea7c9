use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::Collection;

static LINK_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\s+\(").expect("link gap pattern should be valid"));

static RELATIVE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\((/[^)]+)\)").expect("relative link pattern should be valid")
});

/// Normalizes Markdown links in collection descriptions: `[text] (url)`
/// becomes `[text](url)` and site-relative targets (`/docs/x`) are made
/// absolute under `base_url`.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    base_url: String,
}

impl LinkRewriter {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn rewrite(&self, content: &str) -> String {
        let closed = LINK_GAP.replace_all(content, "](");
        RELATIVE_LINK
            .replace_all(&closed, |caps: &Captures| {
                format!("[{}]({}{})", &caps[1], self.base_url, &caps[2])
            })
            .into_owned()
    }

    /// Rewrite every Markdown description in the collection. Plain-text
    /// descriptions are left alone.
    pub fn apply(&self, collection: &mut Collection) {
        collection.visit_descriptions_mut(&mut |description| {
            if description.is_markdown() && !description.content.is_empty() {
                description.content = self.rewrite(&description.content);
            }
        });
    }
}
