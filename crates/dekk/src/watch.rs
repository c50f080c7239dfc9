//! Debounced watching of a presentations directory.

use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

use crate::error::Result;
use crate::registry::DECK_FILENAME;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct DeckWatcher {
    // Dropping the debouncer stops the watch.
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<DebounceEventResult>,
}

impl DeckWatcher {
    pub fn new(dir: &Path, timeout: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(timeout, tx)?;
        debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
        log::debug!("watching {}", dir.display());
        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Whether any deck file changed since the last poll. Never blocks.
    pub fn poll(&self) -> bool {
        let mut changed = false;
        for result in self.rx.try_iter() {
            match result {
                Ok(events) => {
                    changed |= events
                        .iter()
                        .any(|event| event.path.file_name().is_some_and(|name| name == DECK_FILENAME));
                }
                Err(e) => log::warn!("watch error: {e:?}"),
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_reports_deck_changes() {
        let tmp = tempfile::tempdir().unwrap();
        let deck = tmp.path().join("talk");
        std::fs::create_dir_all(&deck).unwrap();
        let watcher = DeckWatcher::new(tmp.path(), Duration::from_millis(50)).unwrap();
        assert!(!watcher.poll());

        std::fs::write(deck.join(DECK_FILENAME), "# changed").unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while Instant::now() < deadline && !seen {
            std::thread::sleep(Duration::from_millis(50));
            seen = watcher.poll();
        }
        assert!(seen, "expected a slides.md change to be reported");
    }
}
