// Local crates
use crate::{
    normalizer::models::Category,
    source::models::{Alert, Call, Message},
};

// External crates
use std::collections::{HashMap, HashSet};

/// Identity keys seen in the previous poll, per category.
///
/// Only one cycle is remembered: every call to [`DedupWindow::filter`] replaces the
/// stored set for its category with the keys of the batch it was given. An event that
/// skips one poll and then reappears is therefore new again.
#[derive(Debug)]
pub struct DedupWindow {
    previous: HashMap<Category, HashSet<String>>,
}

impl DedupWindow {
    pub fn new() -> Self {
        Self {
            previous: Category::ALL
                .into_iter()
                .map(|category| (category, HashSet::new()))
                .collect(),
        }
    }

    /// Drop events whose key was seen in the previous poll of `category`, and return
    /// the rest oldest-first.
    ///
    /// `events` must be newest-first, the order the platform lists them in.
    pub fn filter<T, F>(&mut self, category: Category, events: Vec<T>, key: F) -> Vec<T>
    where
        F: Fn(&T) -> String,
    {
        let keys: Vec<String> = events.iter().map(&key).collect();
        let previous = self
            .previous
            .insert(category, keys.iter().cloned().collect())
            .unwrap_or_default();

        let mut fresh: Vec<T> = events
            .into_iter()
            .zip(keys)
            .filter(|(_, k)| !previous.contains(k))
            .map(|(event, _)| event)
            .collect();

        fresh.reverse();
        fresh
    }

    /// Number of keys remembered for `category`.
    pub fn remembered(&self, category: Category) -> usize {
        self.previous.get(&category).map_or(0, HashSet::len)
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Alerts are identified by sid alone.
pub fn alert_key(alert: &Alert) -> String {
    alert.sid.clone()
}

/// A message status transition counts as a new occurrence.
pub fn message_key(message: &Message) -> String {
    format!("{}{}", message.sid, message.status)
}

/// A call status transition counts as a new occurrence.
pub fn call_key(call: &Call) -> String {
    format!("{}{}", call.sid, call.status)
}
