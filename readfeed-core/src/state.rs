use async_stream::stream;
use futures_util::stream::{BoxStream, StreamExt};

use crate::present::{ArticlePresenter, ArticleView};
use crate::repository::ArticleRepository;

/// What a screen shows: still waiting, a value, or a terminal failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    Loading,
    Data(T),
    Error(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Article list screen states for `identity`: `Loading`, then one `Data` per
/// cache snapshot, or a final `Error` when the cache subscription fails.
pub fn article_list_states(
    repository: &ArticleRepository,
    presenter: ArticlePresenter,
    identity: &str,
) -> BoxStream<'static, LoadState<Vec<ArticleView>>> {
    let mut articles = repository.articles(identity);

    stream! {
        yield LoadState::Loading;
        while let Some(item) = articles.next().await {
            match item {
                Ok(list) => {
                    yield LoadState::Data(presenter.present_all(&list));
                }
                Err(err) => {
                    yield LoadState::Error(err.to_string());
                    break;
                }
            }
        }
    }
    .boxed()
}
