// src/subscription.rs

use std::fmt;

/// Handle to a live sensor subscription.
///
/// Dropping the handle releases the underlying platform subscription, so a
/// session that owns one cannot leak a running sensor stream on any exit path.
/// [`Subscription::cancel`] does the same thing explicitly.
pub struct Subscription {
    label: &'static str,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Creates a subscription whose `release` closure stops the platform stream.
    pub fn new<F>(label: &'static str, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Subscription {
            label,
            release: Some(Box::new(release)),
        }
    }

    /// Releases the subscription now.
    pub fn cancel(mut self) {
        self.release_now();
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            log::debug!("Releasing {} subscription", self.label);
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_release_runs_exactly_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let subscription = Subscription::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        subscription.cancel();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let counter = released.clone();
            let _subscription = Subscription::new("test", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
