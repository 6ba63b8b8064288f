use super::Notifier;
use std::sync::{Mutex, MutexGuard};

/// Keeps every notification in memory
///
/// Useful for embedding the pipeline in another program, and in tests.
#[derive(Debug)]
pub struct CollectingNotifier<T> {
    records: Mutex<Vec<(String, T)>>,
    completions: Mutex<Vec<String>>,
}

impl<T> CollectingNotifier<T> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            completions: Mutex::new(Vec::new()),
        }
    }

    /// Names of the workers that reported completion, in order
    pub fn completions(&self) -> Vec<String> {
        lock(&self.completions).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns everything collected so far
    pub fn take(&self) -> Vec<(String, T)> {
        std::mem::take(&mut *lock(&self.records))
    }
}

impl<T: Clone> CollectingNotifier<T> {
    /// `(source, record)` pairs in arrival order
    pub fn records(&self) -> Vec<(String, T)> {
        lock(&self.records).clone()
    }
}

impl<T> Default for CollectingNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> Notifier<T> for CollectingNotifier<T> {
    fn on_new_data(&self, source: &str, record: &T) {
        lock(&self.records).push((source.to_string(), record.clone()));
    }

    fn on_completed(&self, source: &str) {
        lock(&self.completions).push(source.to_string());
    }
}

// A panicking reader must not hide what was collected
fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
