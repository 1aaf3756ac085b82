//! Cursor pagination over a ranked sequence
//!
//! A cursor names the last item a client has seen by its sort key. The next
//! page starts at the first item that sorts strictly after that key, so
//! posts inserted ahead of the cursor between requests never shift the
//! window and nothing is duplicated or skipped.
//!
//! Cursors that fail to verify are not errors to the caller: they are logged,
//! counted, and the request is served from page 1.

pub mod cursor;

pub use cursor::{CursorCodec, CURSOR_VERSION};

use crate::config::{RankingConfig, MAX_PAGE_SIZE};
use crate::error::ConfigError;
use crate::metrics;
use crate::models::{FeedSort, RankedPage, RankedPost};
use crate::services::ranking::SortKey;
use tracing::{debug, warn};

/// Slice one page out of an ordered sequence.
///
/// `ordered` must already be in ranking order for `sort`.
pub fn paginate(
    ordered: &[RankedPost],
    page_size: usize,
    cursor: Option<&str>,
    codec: &CursorCodec,
    sort: FeedSort,
) -> Result<RankedPage, ConfigError> {
    validate_page_size(page_size)?;

    let start = match cursor.filter(|token| !token.is_empty()) {
        None => 0,
        Some(token) => match codec.decode(token, sort) {
            Ok(key) => ordered.partition_point(|ranked| !key.precedes(ranked)),
            Err(e) => {
                warn!(error = %e, sort = sort.as_str(), "Rejected pagination cursor, serving first page");
                metrics::record_cursor_rejected();
                0
            }
        },
    };

    let end = start.saturating_add(page_size).min(ordered.len());
    let items = ordered[start..end].to_vec();
    let has_more = end < ordered.len();

    let next_cursor = match (has_more, items.last()) {
        (true, Some(last)) => match codec.encode(sort, &SortKey::of(last)) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(error = %e, post_id = %last.post.id, "Failed to issue next cursor");
                None
            }
        },
        _ => None,
    };

    debug!(
        sort = sort.as_str(),
        start,
        returned = items.len(),
        total = ordered.len(),
        has_more,
        "Page served"
    );

    Ok(RankedPage {
        items,
        next_cursor,
        has_more,
    })
}

fn validate_page_size(page_size: usize) -> Result<(), ConfigError> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::InvalidPageSize {
            value: page_size,
            max: MAX_PAGE_SIZE,
        });
    }
    Ok(())
}

/// Codec plus a validated page size
#[derive(Debug, Clone)]
pub struct Paginator {
    codec: CursorCodec,
    page_size: usize,
}

impl Paginator {
    pub fn new(secret: impl AsRef<[u8]>, page_size: usize) -> Result<Self, ConfigError> {
        validate_page_size(page_size)?;
        Ok(Self {
            codec: CursorCodec::new(secret)?,
            page_size,
        })
    }

    pub fn from_config(secret: impl AsRef<[u8]>, config: &RankingConfig) -> Result<Self, ConfigError> {
        Self::new(secret, config.page_size)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn codec(&self) -> &CursorCodec {
        &self.codec
    }

    pub fn paginate(
        &self,
        ordered: &[RankedPost],
        sort: FeedSort,
        cursor: Option<&str>,
    ) -> RankedPage {
        // page_size was validated in the constructor
        paginate(ordered, self.page_size, cursor, &self.codec, sort)
            .unwrap_or_else(|_| RankedPage::empty())
    }
}
