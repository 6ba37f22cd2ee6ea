use std::future::Future;

use log::debug;
use tokio::{
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};

/// A task that runs `tick` immediately and then once per period, until it is
/// unmounted or dropped.
///
/// Unmounting cancels a tick that is still in flight, so nothing it would
/// have written lands after the owning page is gone.
pub struct Poller {
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling. Must be called from within a tokio runtime.
    pub fn mount<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            // A slow tick delays the next one rather than causing a burst.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        debug!("Polling every {period:?}");
        Self {
            handle: Some(handle),
        }
    }

    /// Whether the polling task is still running.
    pub fn is_mounted(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Stop polling and wait until the task has actually stopped.
    pub async fn unmount(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            // Cancellation is the expected outcome.
            let _ = handle.await;
            debug!("Polling stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    fn counting_poller(period: Duration) -> (Poller, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let tick_count = count.clone();
        let poller = Poller::mount(period, move || {
            let count = tick_count.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        (poller, count)
    }

    #[tokio::test(start_paused = true)]
    async fn one_tick_per_period_while_mounted() {
        let (poller, count) = counting_poller(Duration::from_secs(5));

        // Immediately on mount, then at 5s and 10s.
        time::sleep(Duration::from_secs(12)).await;
        assert!(poller.is_mounted());
        assert_eq!(count.load(Ordering::SeqCst), 3);

        poller.unmount().await;
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_polling() {
        let (poller, count) = counting_poller(Duration::from_secs(5));
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        drop(poller);
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_cancels_tick_in_flight() {
        let finished = Arc::new(AtomicUsize::new(0));
        let tick_finished = finished.clone();
        let poller = Poller::mount(Duration::from_secs(5), move || {
            let finished = tick_finished.clone();
            async move {
                // A slow request.
                time::sleep(Duration::from_secs(3)).await;
                finished.fetch_add(1, Ordering::SeqCst);
            }
        });

        time::sleep(Duration::from_secs(1)).await;
        poller.unmount().await;
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
