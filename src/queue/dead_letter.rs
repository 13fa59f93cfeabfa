use std::collections::VecDeque;

use crate::models::job::JobId;

/// Bounded holding area for jobs that exhausted their retry budget.
/// Holds ids only; the job map keeps the records themselves.
#[derive(Debug)]
pub struct DeadLetterStore {
    ids: VecDeque<JobId>,
    capacity: usize,
}

impl DeadLetterStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a job id, evicting and returning the oldest entry when the
    /// store is at capacity.
    pub fn push(&mut self, job_id: JobId) -> Option<JobId> {
        self.ids.push_back(job_id);
        if self.ids.len() > self.capacity {
            self.ids.pop_front()
        } else {
            None
        }
    }

    /// Remove a specific id (used when a dead-lettered job is re-queued).
    pub fn remove(&mut self, job_id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|id| id == job_id) {
            self.ids.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &JobId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let mut store = DeadLetterStore::new(2);
        assert_eq!(store.push("a".into()), None);
        assert_eq!(store.push("b".into()), None);
        assert_eq!(store.push("c".into()), Some("a".to_string()));
        assert_eq!(store.len(), 2);
        let ids: Vec<_> = store.ids().cloned().collect();
        assert_eq!(ids, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn remove_by_id() {
        let mut store = DeadLetterStore::new(4);
        store.push("a".into());
        store.push("b".into());
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert_eq!(store.len(), 1);
    }
}
