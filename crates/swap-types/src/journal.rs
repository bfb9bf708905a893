//! Ordered record of collaborator calls.
//!
//! Mock collaborators append one entry per call. Sharing a journal between
//! several mocks shows the order in which the engine invoked them.

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct CallJournal(Arc<Mutex<Vec<String>>>);

impl CallJournal {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&self, entry: impl Into<String>) {
		if let Ok(mut entries) = self.0.lock() {
			entries.push(entry.into());
		}
	}

	pub fn entries(&self) -> Vec<String> {
		self.0
			.lock()
			.map(|entries| entries.clone())
			.unwrap_or_default()
	}
}
