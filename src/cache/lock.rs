use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock request-scoped state, recovering the guard if a previous holder panicked.
///
/// The state behind these locks is rebuilt per request, so a poisoned lock
/// only ever carries data from the request that is already failing.
pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    component: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                component,
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                "Recovered from poisoned request-state lock"
            );
            poisoned.into_inner()
        }
    }
}
