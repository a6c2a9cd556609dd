use std::io::Cursor;

use tracing::debug;

use crate::article::Article;
use crate::error::DecodeError;

/// Turns a raw feed document into articles, in document order.
pub trait FeedDecoder: Send + Sync {
    fn decode(&self, raw: &str) -> Result<Vec<Article>, DecodeError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RssDecoder;

impl FeedDecoder for RssDecoder {
    fn decode(&self, raw: &str) -> Result<Vec<Article>, DecodeError> {
        let channel = match rss::Channel::read_from(Cursor::new(raw.as_bytes())) {
            Ok(channel) => channel,
            // The rss crate reports a well-formed document without a
            // <channel> element as Eof.
            Err(rss::Error::Eof) if is_closed_rss_document(raw) => {
                debug!("feed document has no channel");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let articles: Vec<Article> = channel.items().iter().map(article_from_item).collect();
        debug!(count = articles.len(), "decoded feed items");
        Ok(articles)
    }
}

pub fn article_from_item(item: &rss::Item) -> Article {
    let published_at = extension_value(item, "atom", "updated")
        .or_else(|| item.pub_date())
        .unwrap_or_default();

    let content = item
        .content()
        .or_else(|| extension_value(item, "content", "encoded"))
        .or_else(|| item.description())
        .unwrap_or_default();

    Article {
        title: item.title().unwrap_or_default().to_owned(),
        published_at: published_at.to_owned(),
        content: content.to_owned(),
    }
}

fn extension_value<'a>(item: &'a rss::Item, prefix: &str, name: &str) -> Option<&'a str> {
    item.extensions()
        .get(prefix)
        .and_then(|elements| elements.get(name))
        .and_then(|values| values.first())
        .and_then(|ext| ext.value())
}

/// True when the document opens an `<rss>` root and closes it again, i.e.
/// the parser ran out of input because nothing was there, not because the
/// document was cut short. Only comments, processing instructions and
/// doctypes may surround the root.
fn is_closed_rss_document(raw: &str) -> bool {
    let Some(root) = find_rss_root(raw) else {
        return false;
    };
    if !is_markup_only(&raw[..root]) {
        return false;
    }

    let body = &raw[root..];
    let Some(tag_end) = body.find('>') else {
        return false;
    };
    let root_end = if body[..tag_end].ends_with('/') {
        tag_end + 1
    } else {
        match body.rfind("</rss>") {
            Some(close) => close + "</rss>".len(),
            None => return false,
        }
    };
    is_markup_only(&body[root_end..])
}

/// Offset of the `<rss` start tag, not matching longer names like `<rssx`.
fn find_rss_root(raw: &str) -> Option<usize> {
    raw.match_indices("<rss").map(|(idx, _)| idx).find(|&idx| {
        raw[idx + "<rss".len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
    })
}

fn is_markup_only(text: &str) -> bool {
    let mut rest = text.trim();
    while !rest.is_empty() {
        let Some(stripped) = rest.strip_prefix('<') else {
            return false;
        };
        let allowed = stripped.starts_with('?') || stripped.starts_with('!');
        if !allowed {
            return false;
        }
        match stripped.find('>') {
            Some(end) => rest = stripped[end + 1..].trim_start(),
            None => return false,
        }
    }
    true
}
