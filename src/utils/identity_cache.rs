use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use super::identity_filter::{Identity, key};

/// Holds only taken identities; absence means "ask the database".
pub static IDENTITY_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn mark_taken(identity: Identity, value: &str) {
    IDENTITY_CACHE.insert(key(identity, value), true).await;
}

pub async fn is_taken(identity: Identity, value: &str) -> bool {
    IDENTITY_CACHE
        .get(&key(identity, value))
        .await
        .unwrap_or(false)
}

/// Drop a value that was freed by a rename or delete
pub async fn forget(identity: Identity, value: &str) {
    IDENTITY_CACHE.invalidate(&key(identity, value)).await;
}

async fn batch_mark(keys: Vec<String>) {
    let futures: Vec<_> = keys
        .into_iter()
        .map(|k| IDENTITY_CACHE.insert(k, true))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load identities of users touched in the last `days` days (batched)
pub async fn warmup_identity_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, String, Option<String>)>(
        r#"
        SELECT username, email, emp_no
        FROM users
        WHERE updated_at >= NOW() - INTERVAL ? DAY
        ORDER BY updated_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size * 3);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (username, email, emp_no) = row?;
        batch.push(key(Identity::Username, &username));
        batch.push(key(Identity::Email, &email));
        if let Some(emp_no) = emp_no {
            batch.push(key(Identity::EmpNo, &emp_no));
        }
        total_count += 1;

        if total_count % batch_size == 0 {
            batch_mark(std::mem::take(&mut batch)).await;
        }
    }

    if !batch.is_empty() {
        batch_mark(batch).await;
    }

    log::info!(
        "Identity cache warmup complete: {} recent users (last {} days)",
        total_count,
        days
    );

    Ok(())
}
