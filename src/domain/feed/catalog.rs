//! The default catalog: feeds every deployment lists before anything has been
//! registered. It is built once at startup and handed to the store.

use anyhow::{bail, Context};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use super::model::Feed;

const BBC_IMAGE: &str = "https://news.bbcimg.co.uk/nol/shared/img/bbc_news_120x60.gif";
const SKY_IMAGE: &str = "http://feeds.skynews.com/images/web/logo/skynews_rss.png";

/// The four feeds shipped with the service.
pub fn reference_catalog() -> Arc<[Feed]> {
    vec![
        Feed {
            id: "b1031651-411c-40bb-b269-d247794dfd59".to_string(),
            title: "BBC News - UK".to_string(),
            description: "BBC News - UK".to_string(),
            url: "http://feeds.bbci.co.uk/news/uk/rss.xml".to_string(),
            image_url: BBC_IMAGE.to_string(),
            category: String::new(),
        },
        Feed {
            id: "c2970c84-37c8-4ec1-8861-4b5a91ebff0d".to_string(),
            title: "BBC News - Technology".to_string(),
            description: "BBC News - Technology".to_string(),
            url: "http://feeds.bbci.co.uk/news/technology/rss.xml".to_string(),
            image_url: BBC_IMAGE.to_string(),
            category: String::new(),
        },
        Feed {
            id: "28059396-5113-46ed-b76b-6d482a3bbcf3".to_string(),
            title: "UK News - The latest headlines from the UK | Sky News".to_string(),
            description: "Expert comment and analysis on the latest UK news, with headlines from England, Scotland, Northern Ireland and Wales.".to_string(),
            url: "http://feeds.skynews.com/feeds/rss/uk.xml".to_string(),
            image_url: SKY_IMAGE.to_string(),
            category: "Sky News".to_string(),
        },
        Feed {
            id: "a2370e4f-0e7f-4844-83cb-b54c02b0bf1f".to_string(),
            title: "Tech News - Latest Technology and Gadget News | Sky News".to_string(),
            description: "Sky News technology provides you with all the latest tech and gadget news, game reviews, Internet and web news across the globe. Visit us today.".to_string(),
            url: "http://feeds.skynews.com/feeds/rss/technology.xml".to_string(),
            image_url: SKY_IMAGE.to_string(),
            category: "Sky News".to_string(),
        },
    ]
    .into()
}

/// Read a replacement catalog from a JSON array of feeds.
///
/// Every entry must carry its own non-empty `ID`, and no two entries may share
/// an `ID` or a `URL`.
pub fn load_catalog(path: impl AsRef<Path>) -> anyhow::Result<Arc<[Feed]>> {
    let path = path.as_ref();
    let raw = std::fs::read(path)
        .with_context(|| format!("reading default catalog {}", path.display()))?;
    let feeds: Vec<Feed> = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing default catalog {}", path.display()))?;

    validate(&feeds)?;
    tracing::info!(path = %path.display(), feeds = feeds.len(), "Loaded default catalog");

    Ok(feeds.into())
}

fn validate(feeds: &[Feed]) -> anyhow::Result<()> {
    let mut ids = HashSet::new();
    let mut urls = HashSet::new();

    for feed in feeds {
        if feed.id.is_empty() {
            bail!("catalog entry for {} has no ID", feed.url);
        }
        if !ids.insert(feed.id.as_str()) {
            bail!("duplicate catalog ID {}", feed.id);
        }
        if !urls.insert(feed.url.as_str()) {
            bail!("duplicate catalog URL {}", feed.url);
        }
    }

    Ok(())
}
