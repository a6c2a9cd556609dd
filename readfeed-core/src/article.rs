use serde::{Deserialize, Serialize};

/// An article as the rest of the application sees it. Two articles are the
/// same article when all three fields match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Article {
    pub title: String,
    /// Timestamp token exactly as the feed delivered it.
    pub published_at: String,
    /// Raw HTML body.
    pub content: String,
}

/// One row of the article table. `id` is assigned by the store; `0` marks a
/// row that has not been inserted yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedArticle {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(rename = "datetime")]
    pub published_at: String,
    pub content: String,
}

impl CachedArticle {
    pub fn into_article(self) -> Article {
        Article {
            title: self.title,
            published_at: self.published_at,
            content: self.content,
        }
    }
}

impl From<Article> for CachedArticle {
    fn from(article: Article) -> Self {
        Self {
            id: 0,
            title: article.title,
            published_at: article.published_at,
            content: article.content,
        }
    }
}

impl From<CachedArticle> for Article {
    fn from(row: CachedArticle) -> Self {
        row.into_article()
    }
}
