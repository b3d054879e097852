use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::{PoisonError, RwLock};
use strum_macros::AsRefStr;

/// Expected capacity and false-positive rate.
/// Three keys per user (username, email, emp no).
const FILTER_CAPACITY: usize = 300_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// A uniquely indexed user attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Identity {
    Username,
    Email,
    EmpNo,
}

impl Identity {
    /// Column holding this identity in `users`.
    pub fn column(self) -> &'static str {
        match self {
            Identity::Username => "username",
            Identity::Email => "email",
            Identity::EmpNo => "emp_no",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Identity::Username => "Username",
            Identity::Email => "Email",
            Identity::EmpNo => "Employee number",
        }
    }
}

static IDENTITY_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// `email:jane@corp.com`; lookups are case-insensitive like the MySQL collation.
#[inline]
pub fn key(identity: Identity, value: &str) -> String {
    format!("{}:{}", identity.as_ref(), value.trim().to_lowercase())
}

/// Check if a value might be taken (false positives possible)
pub fn might_exist(identity: Identity, value: &str) -> bool {
    IDENTITY_FILTER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(&key(identity, value))
}

pub fn insert(identity: Identity, value: &str) {
    IDENTITY_FILTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .add(&key(identity, value));
}

pub fn remove(identity: Identity, value: &str) {
    IDENTITY_FILTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&key(identity, value));
}

/// Warm up the filter from every user, streaming in batches
pub async fn warmup_identity_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, String, Option<String>)>(
        "SELECT username, email, emp_no FROM users",
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size * 3);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (username, email, emp_no) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(key(Identity::Username, &username));
        batch.push(key(Identity::Email, &email));
        if let Some(emp_no) = emp_no {
            batch.push(key(Identity::EmpNo, &emp_no));
        }
        total += 1;

        if total % batch_size == 0 {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Identity filter warmup complete: {} users", total);
    Ok(())
}

fn insert_batch(keys: &[String]) {
    let mut filter = IDENTITY_FILTER
        .write()
        .unwrap_or_else(PoisonError::into_inner);

    for key in keys {
        filter.add(key);
    }
}
