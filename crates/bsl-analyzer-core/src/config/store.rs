//! Holder of the current configuration snapshot.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::ConfigurationSnapshot;

/// Capacity of the change notification channel. Slow subscribers skip
/// intermediate snapshots, which is fine since only the latest one matters.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// The current configuration, swapped atomically on reload.
///
/// Readers call [`ConfigurationStore::current`] once per request and keep
/// the returned `Arc` for the whole request, so a concurrent reload never
/// changes the configuration under them.
#[derive(Debug)]
pub struct ConfigurationStore {
    current: ArcSwap<ConfigurationSnapshot>,
    changes: broadcast::Sender<Arc<ConfigurationSnapshot>>,
}

impl ConfigurationStore {
    /// Creates a store holding the initial snapshot.
    #[must_use]
    pub fn new(initial: ConfigurationSnapshot) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            current: ArcSwap::from_pointee(initial),
            changes,
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<ConfigurationSnapshot> {
        self.current.load_full()
    }

    /// Replaces the current snapshot and notifies subscribers.
    pub fn publish(&self, snapshot: ConfigurationSnapshot) {
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        // No subscribers is not an error.
        let receivers = self.changes.send(snapshot).unwrap_or(0);
        debug!("Published configuration snapshot to {receivers} subscriber(s)");
    }

    /// Subscribes to configuration changes published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ConfigurationSnapshot>> {
        self.changes.subscribe()
    }
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new(ConfigurationSnapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverride, Parameters, RuleSetting};
    use crate::i18n::Language;

    #[test]
    fn readers_keep_their_snapshot_across_publish() {
        let store = ConfigurationStore::default();
        let before = store.current();

        store.publish(
            ConfigurationSnapshot::new().with_rule("LineLength", RuleSetting::Toggle(false)),
        );

        assert_eq!(before.override_for("LineLength"), ConfigOverride::Absent);
        assert_eq!(
            store.current().override_for("LineLength"),
            ConfigOverride::Toggle(false)
        );
    }

    #[tokio::test]
    async fn subscribers_receive_published_snapshot() {
        let store = ConfigurationStore::default();
        let mut changes = store.subscribe();

        store.publish(ConfigurationSnapshot::new().with_language(Language::En));

        let received = changes.recv().await.unwrap();
        assert_eq!(received.diagnostic_language, Language::En);
        assert!(Arc::ptr_eq(&received, &store.current()));
    }

    #[test]
    fn concurrent_readers_see_whole_snapshots() {
        // Every published snapshot sets both rules to the same value, so a
        // reader seeing a mix would have observed a partial update.
        let store = Arc::new(ConfigurationStore::default());
        let snapshot_for = |n: i64| {
            let params = Parameters::new().with("generation", n);
            ConfigurationSnapshot::new()
                .with_rule("A", RuleSetting::Parameters(params.clone()))
                .with_rule("B", RuleSetting::Parameters(params))
        };
        store.publish(snapshot_for(0));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let snapshot = store.current();
                        let generation = |code| match snapshot.override_for(code) {
                            ConfigOverride::Parameters(p) => p.get_int("generation", -1),
                            _ => -1,
                        };
                        assert_eq!(generation("A"), generation("B"));
                    }
                })
            })
            .collect();

        for n in 1..200 {
            store.publish(snapshot_for(n));
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
