mod render;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use futures_util::StreamExt;
use readfeed_core::{
    article_list_states, ArticlePresenter, ArticleRepository, ArticleStore, HttpFeedSource,
    LoadState, ReaderConfig, RssDecoder,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// ReadFeed - shows an author's feed from the local cache and refreshes it
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Opts {
    /// Username whose feed is shown, without the leading `@`
    username: String,

    /// Config file, defaults to ~/.config/readfeed/config.json
    #[arg(long, env = "READFEED_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `remote.base_url`
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `storage.cache_file`
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Exit once the refreshed list has been printed
    #[arg(long)]
    once: bool,

    /// Wrap width of the content preview
    #[arg(long, default_value = "80")]
    width: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let opts = Opts::parse();

    let mut config = match &opts.config {
        Some(path) => ReaderConfig::load_from(path)?,
        None => ReaderConfig::load(),
    };
    if let Some(base_url) = opts.base_url.clone() {
        config.remote.base_url = base_url;
    }
    if let Some(cache) = opts.cache.clone() {
        config.storage.cache_file = Some(cache);
    }

    let store = ArticleStore::open(config.cache_file_path()?).await;
    let remote = HttpFeedSource::from_config(&config.remote)?;
    let sync = config.sync.to_sync_config();
    let repository = ArticleRepository::new(Arc::new(store), Arc::new(remote), Arc::new(RssDecoder), sync);
    let presenter = ArticlePresenter::new(config.display.clone());

    let username = opts.username.trim_start_matches('@');
    let mut states = article_list_states(&repository, presenter, username);
    // Long enough for every configured attempt to finish.
    let refresh_window = (sync.fetch_timeout + sync.retry_backoff) * (u32::from(sync.max_retries) + 1)
        + Duration::from_secs(1);
    let mut lists_seen = 0usize;

    loop {
        let next = tokio::select! {
            state = states.next() => state,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            _ = tokio::time::sleep(refresh_window), if opts.once && lists_seen > 0 => {
                warn!(username, "no refreshed articles within {refresh_window:?}");
                break;
            }
        };

        let Some(state) = next else {
            break;
        };

        match state {
            LoadState::Loading => render::print_loading(username),
            LoadState::Data(views) => {
                lists_seen += 1;
                render::print_articles(&views, opts.width);
                if opts.once && lists_seen >= 2 {
                    break;
                }
            }
            LoadState::Error(message) => {
                render::print_error(&message);
                return Err(message.into());
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
