//! Bounded-concurrency map over a list of inputs.
//!
//! `min(limit, len)` workers share one queue; each pulls the next unclaimed item until the
//! queue is drained. Workers run cooperatively on the caller's task, so at most `limit`
//! futures produced by `f` are alive at any instant. Output order matches input order.

use futures::future::join_all;
use std::future::Future;
use std::sync::Mutex;

pub async fn bounded_map<T, R, F, Fut>(items: Vec<T>, limit: usize, f: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }

    let workers = limit.max(1).min(total);
    let queue = Mutex::new(items.into_iter().enumerate());

    let next_item = || {
        let mut guard = queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.next()
    };

    let next_item = &next_item;
    let f = &f;
    let runs = (0..workers).map(|_| async move {
        let mut produced = Vec::new();
        while let Some((index, item)) = next_item() {
            produced.push((index, f(item).await));
        }
        produced
    });

    let mut indexed: Vec<(usize, R)> = join_all(runs).await.into_iter().flatten().collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}
