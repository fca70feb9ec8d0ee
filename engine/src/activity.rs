//! Activity log: capped, newest-first, identical for every viewer.

use crate::now_ts;
use std::collections::VecDeque;
use tombola_types::{ActivityEntry, ACTIVITY_LOG_CAP};

#[derive(Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn push(&mut self, msg: String) {
        self.entries.push_front(ActivityEntry { ts: now_ts(), msg });
        self.entries.truncate(ACTIVITY_LOG_CAP);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }
}
