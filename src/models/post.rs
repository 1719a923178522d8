//! Posts as returned by the post source.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A shortened link embedded in a post and its canonical form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub short: String,
    pub expanded: String,
}

/// A single raw post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Post {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            links: Vec::new(),
        }
    }

    pub fn with_link(mut self, short: impl Into<String>, expanded: impl Into<String>) -> Self {
        self.links.push(Link {
            short: short.into(),
            expanded: expanded.into(),
        });
        self
    }

    /// The post text with every shortened link replaced by its expansion.
    pub fn expanded_text(&self) -> String {
        self.links
            .iter()
            .filter(|link| !link.short.is_empty())
            .fold(self.text.clone(), |text, link| {
                text.replace(&link.short, &link.expanded)
            })
    }
}

/// One collection's posts: the ordered ids plus a lookup table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    /// Post ids in source order. This order is never re-sorted.
    pub ids: Vec<String>,
    pub posts: HashMap<String, Post>,
}

impl Timeline {
    /// Build a timeline from posts already in source order.
    pub fn from_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let mut timeline = Timeline::default();
        for post in posts {
            timeline.ids.push(post.id.clone());
            timeline.posts.insert(post.id.clone(), post);
        }
        timeline
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_text_replaces_every_occurrence() {
        let post = Post::new("1", "see https://t.co/x and https://t.co/x")
            .with_link("https://t.co/x", "https://example.com/long");
        assert_eq!(
            post.expanded_text(),
            "see https://example.com/long and https://example.com/long"
        );
    }

    #[test]
    fn test_expanded_text_without_links_is_raw() {
        let post = Post::new("1", "title: A");
        assert_eq!(post.expanded_text(), "title: A");
    }

    #[test]
    fn test_timeline_keeps_source_order() {
        let timeline = Timeline::from_posts(vec![Post::new("9", "a"), Post::new("2", "b")]);
        assert_eq!(timeline.ids, vec!["9", "2"]);
        assert_eq!(timeline.posts["2"].text, "b");
    }
}
