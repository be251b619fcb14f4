use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Document, new_id};
use crate::{Result, validate};

/// An article written by clinic staff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Document id.
    pub id: String,
    /// User id of the author.
    pub author_id: String,
    /// Title.
    pub title: String,
    /// URL slug, unique across posts.
    pub slug: String,
    /// Body text (markdown).
    pub content: String,
    /// Lower-cased tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the post is publicly visible.
    pub published: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document for BlogPost {
    const COLLECTION: &'static str = "blog_posts";

    fn id(&self) -> &str {
        &self.id
    }
}

impl BlogPost {
    /// Create a validated post. The caller provides a unique slug.
    pub fn new(
        author_id: &str,
        title: &str,
        slug: String,
        content: &str,
        tags: Vec<String>,
        published: bool,
    ) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: new_id(),
            author_id: author_id.to_string(),
            title: validate::non_blank("title", title)?,
            slug,
            content: validate::non_blank("content", content)?,
            tags: normalize_tags(tags),
            published,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the editable fields. The slug is kept.
    pub fn update(
        &mut self,
        title: &str,
        content: &str,
        tags: Vec<String>,
        published: bool,
    ) -> Result<()> {
        let title = validate::non_blank("title", title)?;
        let content = validate::non_blank("content", content)?;
        self.title = title;
        self.content = content;
        self.tags = normalize_tags(tags);
        self.published = published;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether the post carries `tag` (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.tags.iter().any(|t| *t == tag)
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
