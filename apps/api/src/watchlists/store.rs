use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::watchlist::{WatchItemRow, WatchItemType, WatchlistRow};

/// Parameters for one watch item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWatchItem {
    pub item_type: WatchItemType,
    pub handle: Option<String>,
    pub hashtag: Option<String>,
    pub source: String,
}

/// Inserts the watchlist and its items in one transaction. Nothing is kept
/// when any insert fails.
pub async fn create_watchlist(
    pool: &PgPool,
    project_id: Uuid,
    name: &str,
    niche: &str,
    items: &[NewWatchItem],
) -> Result<(WatchlistRow, Vec<WatchItemRow>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let watchlist = sqlx::query_as::<_, WatchlistRow>(
        r#"
        INSERT INTO tiktok_watchlists (id, project_id, name, niche)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(project_id)
    .bind(name)
    .bind(niche)
    .fetch_one(&mut *tx)
    .await?;

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, WatchItemRow>(
            r#"
            INSERT INTO tiktok_watch_items
                (id, watchlist_id, item_type, handle, hashtag, source, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(watchlist.id)
        .bind(item.item_type.as_str())
        .bind(item.handle.as_deref())
        .bind(item.hashtag.as_deref())
        .bind(&item.source)
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;

    debug!("Watchlist {} stored with {} items", watchlist.id, rows.len());
    Ok((watchlist, rows))
}
