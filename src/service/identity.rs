//! Fallback identity allocation: probe candidates until one is unused.
//!
//! Not safe under concurrent allocators: two callers can both see a candidate
//! as free and then both insert it. Prefer a store-generated identity where the
//! schema allows one.

use crate::error::AppError;
use crate::model::Resource;
use crate::service::ResourceApi;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 32;

pub trait IdentityCandidates: Send {
    fn next_candidate(&mut self) -> i64;
}

/// Microsecond timestamps, strictly increasing within one generator.
#[derive(Debug, Default)]
pub struct TimeCandidates {
    last: i64,
}

impl IdentityCandidates for TimeCandidates {
    fn next_candidate(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_micros();
        self.last = now.max(self.last + 1);
        self.last
    }
}

impl<I> IdentityCandidates for I
where
    I: Iterator<Item = i64> + Send,
{
    fn next_candidate(&mut self) -> i64 {
        self.next().unwrap_or_default()
    }
}

/// Returns the first candidate for which `get` with only the identity set finds no row.
pub async fn allocate_free_identity<R>(
    api: &ResourceApi<R>,
    candidates: &mut impl IdentityCandidates,
    max_attempts: u32,
) -> Result<i64, AppError>
where
    R: Resource<Id = i64>,
{
    for attempt in 1..=max_attempts {
        let id = candidates.next_candidate();
        let mut probe = R::default();
        probe.set_identity(Some(id));
        if api.get(probe).await?.is_empty() {
            tracing::debug!(resource = R::NAME, id, attempt, "allocated identity");
            return Ok(id);
        }
        tracing::debug!(resource = R::NAME, id, attempt, "identity taken, retrying");
    }
    Err(AppError::IdentityExhausted {
        resource: R::NAME,
        attempts: max_attempts,
    })
}
