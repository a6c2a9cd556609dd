use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::article::Article;
use crate::config::DisplayConfig;

// Double-quoted src only, and `.` does not cross line breaks.
static FIGURE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<figure.*?<img.*?src="([^"]+)".*?</figure>"#).expect("valid figure regex")
});

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p[^>]*>(.*?)</p>").expect("valid paragraph regex"));

/// Timezone used when rendering article dates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
    /// Seconds east of UTC.
    FixedOffset(i32),
}

/// Display-ready article for list and detail screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleView {
    pub image_url: Option<String>,
    pub title: String,
    pub display_date: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct ArticlePresenter {
    config: DisplayConfig,
}

impl ArticlePresenter {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    pub fn present(&self, article: &Article) -> ArticleView {
        ArticleView {
            image_url: image_from_figure(&article.content),
            title: article.title.clone(),
            display_date: readable_date(
                &article.published_at,
                &self.config.date_pattern,
                self.config.timezone,
            ),
            content: article.content.clone(),
        }
    }

    pub fn present_all(&self, articles: &[Article]) -> Vec<ArticleView> {
        articles.iter().map(|article| self.present(article)).collect()
    }
}

/// Formats an RFC 3339 instant with a strftime `pattern` in `zone`. Anything
/// that does not parse or format comes back unchanged.
pub fn readable_date(raw: &str, pattern: &str, zone: DisplayZone) -> String {
    let Ok(instant) = DateTime::parse_from_rfc3339(raw) else {
        return raw.to_owned();
    };

    let mut out = String::new();
    let written = match zone {
        DisplayZone::Local => write!(out, "{}", instant.with_timezone(&Local).format(pattern)),
        DisplayZone::Utc => write!(out, "{}", instant.with_timezone(&Utc).format(pattern)),
        DisplayZone::FixedOffset(seconds) => match FixedOffset::east_opt(seconds) {
            Some(offset) => write!(out, "{}", instant.with_timezone(&offset).format(pattern)),
            None => return raw.to_owned(),
        },
    };

    match written {
        Ok(()) => out,
        Err(_) => raw.to_owned(),
    }
}

/// Source of the first image wrapped in a `<figure>`.
pub fn image_from_figure(html: &str) -> Option<String> {
    FIGURE_IMAGE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Inner HTML of every non-blank `<p>`, joined with `</p><p>`, for list
/// previews. Input without paragraphs is returned as is.
pub fn extract_paragraphs(html: &str) -> String {
    let paragraphs: Vec<&str> = PARAGRAPH
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        html.to_owned()
    } else {
        paragraphs.join("</p><p>")
    }
}
