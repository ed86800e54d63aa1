//! Named one-shot timers on the tokio runtime.
//!
//! Each scheduled event is a task that sleeps until its deadline. Pending
//! events are indexed by name so they can be cancelled. A firing event takes
//! itself out of the index before its callback runs, so a callback that
//! cancels its own name (or schedules a successor under a new one) never
//! aborts itself. Callbacks run on the blocking pool since skill callbacks
//! sleep.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, error};

use crate::host::{EventCallback, Scheduler};

type Pending = HashMap<String, Vec<(u64, AbortHandle)>>;

pub struct TokioScheduler {
    handle: Handle,
    next_id: AtomicU64,
    pending: Arc<Mutex<Pending>>,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            next_id: AtomicU64::new(0),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of events pending under `name`.
    pub fn pending(&self, name: &str) -> usize {
        lock(&self.pending).get(name).map_or(0, Vec::len)
    }
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Remove event `id` from the index. False if it was cancelled meanwhile.
fn take_entry(pending: &Mutex<Pending>, name: &str, id: u64) -> bool {
    let mut pending = lock(pending);
    let Some(events) = pending.get_mut(name) else {
        return false;
    };
    let before = events.len();
    events.retain(|(event_id, _)| *event_id != id);
    let found = events.len() != before;
    if events.is_empty() {
        pending.remove(name);
    }
    found
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, name: &str, at: Instant, callback: EventCallback) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let task_pending = self.pending.clone();
        let task_name = name.to_string();

        // Hold the index while spawning so an already-due task cannot look
        // itself up before it is inserted.
        let mut pending = lock(&self.pending);
        let task = self.handle.spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await;
            if !take_entry(&task_pending, &task_name, id) {
                return;
            }
            debug!("scheduler: firing {task_name}");
            if let Err(e) = tokio::task::spawn_blocking(callback).await {
                error!("scheduler: event {task_name} failed: {e}");
            }
        });
        pending
            .entry(name.to_string())
            .or_default()
            .push((id, task.abort_handle()));
        debug!("scheduler: scheduled {name}");
    }

    fn cancel(&self, name: &str) {
        if let Some(events) = lock(&self.pending).remove(name) {
            debug!("scheduler: cancelled {} event(s) named {name}", events.len());
            for (_, task) in events {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counter_callback(count: &Arc<AtomicUsize>) -> EventCallback {
        let count = count.clone();
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    #[tokio::test]
    async fn fires_once_after_deadline() {
        let scheduler = TokioScheduler::new(Handle::current());
        let count = Arc::new(AtomicUsize::new(0));
        scheduler.schedule(
            "random_fart0",
            Instant::now() + Duration::from_millis(20),
            counter_callback(&count),
        );
        assert_eq!(scheduler.pending("random_fart0"), 1);

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending("random_fart0"), 0);
    }

    #[tokio::test]
    async fn cancel_prevents_firing() {
        let scheduler = TokioScheduler::new(Handle::current());
        let count = Arc::new(AtomicUsize::new(0));
        scheduler.schedule(
            "random_fart0",
            Instant::now() + Duration::from_millis(50),
            counter_callback(&count),
        );
        scheduler.cancel("random_fart0");

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancel_drops_every_event_with_name() {
        let scheduler = TokioScheduler::new(Handle::current());
        let count = Arc::new(AtomicUsize::new(0));
        let at = Instant::now() + Duration::from_millis(50);
        scheduler.schedule("random_fart0", at, counter_callback(&count));
        scheduler.schedule("random_fart0", at, counter_callback(&count));
        scheduler.schedule("random_fart1", at, counter_callback(&count));
        assert_eq!(scheduler.pending("random_fart0"), 2);

        scheduler.cancel("random_fart0");

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_unknown_name_is_noop() {
        let scheduler = TokioScheduler::new(Handle::current());
        scheduler.cancel("never_scheduled");
        assert_eq!(scheduler.pending("never_scheduled"), 0);
    }

    #[tokio::test]
    async fn callback_cancelling_itself_still_runs() {
        let scheduler = Arc::new(TokioScheduler::new(Handle::current()));
        let count = Arc::new(AtomicUsize::new(0));

        let inner = scheduler.clone();
        let inner_count = count.clone();
        scheduler.schedule(
            "random_fart0",
            Instant::now() + Duration::from_millis(10),
            Box::new(move || {
                inner.cancel("random_fart0");
                inner_count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn past_deadline_fires_immediately() {
        let scheduler = TokioScheduler::new(Handle::current());
        let count = Arc::new(AtomicUsize::new(0));
        scheduler.schedule("late", Instant::now(), counter_callback(&count));

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending("late"), 0);
    }
}
