pub mod article;
pub mod cache;
pub mod config;
pub mod decoder;
pub mod error;
pub mod present;
pub mod remote;
pub mod repository;
pub mod state;

pub use article::{Article, CachedArticle};
pub use cache::{ArticleLocalSource, ArticleStore};
pub use config::{DisplayConfig, ReaderConfig, RemoteConfig, StorageConfig, SyncSettings};
pub use decoder::{FeedDecoder, RssDecoder};
pub use error::{CacheError, ConfigError, DecodeError, RemoteError, SyncError};
pub use present::{extract_paragraphs, image_from_figure, readable_date};
pub use present::{ArticlePresenter, ArticleView, DisplayZone};
pub use remote::{ArticleRemoteSource, HttpFeedSource};
pub use repository::{ArticleRepository, SyncConfig};
pub use state::{article_list_states, LoadState};
