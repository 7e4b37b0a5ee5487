//! Incremental reordering of the thread list
//!
//! The main list is stacked top to bottom as favorites, highlighted threads,
//! then everything else in scraped order. A thread is moved into its
//! partition by locating a single boundary, never by re-sorting the list.
//! Hidden threads live in a separate sublist in arrival order.

use std::collections::HashMap;
use tracing::debug;

use crate::models::{Thread, ThreadId};

/// Visual partition of the main list, in stacking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    Favorite,
    Highlighted,
    Plain,
}

impl Partition {
    /// Partitions that are pulled to the top, in stacking order
    const RANKED: [Partition; 2] = [Partition::Favorite, Partition::Highlighted];
}

/// Row of the main list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEntry {
    /// Separator between sticky threads and the rest
    Separator,
    Thread(ThreadId),
}

/// Where a row was put, for the presentation layer to mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    After(ThreadId),
    Before(ThreadId),
    AfterSeparator,
    Head,
    /// Appended at the end of the main list
    End,
}

#[derive(Debug, Clone)]
pub struct ListOrderer {
    entries: Vec<ListEntry>,
    partitions: HashMap<ThreadId, Partition>,
    hidden: Vec<ThreadId>,
    favorites_top: bool,
    highlighted_top: bool,
}

impl ListOrderer {
    pub fn new(favorites_top: bool, highlighted_top: bool) -> Self {
        Self {
            entries: Vec::new(),
            partitions: HashMap::new(),
            hidden: Vec::new(),
            favorites_top,
            highlighted_top,
        }
    }

    /// Append a thread row in scraped order
    pub fn push_thread(&mut self, id: ThreadId) {
        self.entries.push(ListEntry::Thread(id));
        self.partitions.insert(id, Partition::Plain);
    }

    pub fn push_separator(&mut self) {
        self.entries.push(ListEntry::Separator);
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Thread ids of the main list, top to bottom
    pub fn order(&self) -> Vec<ThreadId> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                ListEntry::Thread(id) => Some(*id),
                ListEntry::Separator => None,
            })
            .collect()
    }

    /// Thread ids of the hidden sublist, in arrival order
    pub fn hidden(&self) -> &[ThreadId] {
        &self.hidden
    }

    pub fn partition_of(&self, id: ThreadId) -> Option<Partition> {
        self.partitions.get(&id).copied()
    }

    /// Partition a thread should be moved to given the on-top settings
    pub fn target_partition(&self, thread: &Thread) -> Partition {
        if thread.is_favorite && self.favorites_top {
            Partition::Favorite
        } else if thread.is_highlighted && !thread.is_favorite && self.highlighted_top {
            Partition::Highlighted
        } else {
            Partition::Plain
        }
    }

    fn position(&self, id: ThreadId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| *entry == ListEntry::Thread(id))
    }

    fn first_of(&self, partition: Partition) -> Option<ThreadId> {
        self.entries.iter().find_map(|entry| match entry {
            ListEntry::Thread(id) if self.partitions.get(id) == Some(&partition) => Some(*id),
            _ => None,
        })
    }

    fn last_of(&self, partition: Partition) -> Option<ThreadId> {
        self.entries.iter().rev().find_map(|entry| match entry {
            ListEntry::Thread(id) if self.partitions.get(id) == Some(&partition) => Some(*id),
            _ => None,
        })
    }

    fn index_after(&self, anchor: ThreadId) -> usize {
        self.position(anchor).map_or(self.entries.len(), |pos| pos + 1)
    }

    fn index_before(&self, anchor: ThreadId) -> usize {
        self.position(anchor).unwrap_or(0)
    }

    /// Move a thread into a ranked partition. A `Plain` target only updates
    /// the bookkeeping and leaves the row where it is.
    ///
    /// The row goes after the partition's last member; failing that, after
    /// the last member of the nearest partition above; failing that, before
    /// the first member of the nearest partition below; failing that, right
    /// after the sticky separator, or at the head of the list.
    pub fn place(&mut self, id: ThreadId, partition: Partition) -> Option<Placement> {
        if partition == Partition::Plain {
            self.partitions.insert(id, Partition::Plain);
            return None;
        }

        if let Some(pos) = self.position(id) {
            self.entries.remove(pos);
        }
        self.partitions.remove(&id);

        let ranked = Partition::RANKED;
        let rank = ranked.iter().position(|p| *p == partition).unwrap_or(0);
        let above = ranked[..rank].iter().rev();
        let below = ranked[rank + 1..].iter();

        let (index, placement) = if let Some(last) = self.last_of(partition) {
            (self.index_after(last), Placement::After(last))
        } else if let Some(last) = above.filter_map(|p| self.last_of(*p)).next() {
            (self.index_after(last), Placement::After(last))
        } else if let Some(first) = below.filter_map(|p| self.first_of(*p)).next() {
            (self.index_before(first), Placement::Before(first))
        } else if let Some(sep) = self
            .entries
            .iter()
            .position(|entry| *entry == ListEntry::Separator)
        {
            (sep + 1, Placement::AfterSeparator)
        } else {
            (0, Placement::Head)
        };

        self.entries.insert(index, ListEntry::Thread(id));
        self.partitions.insert(id, partition);
        debug!("Placed thread {} into {:?} at {:?}", id, partition, placement);
        Some(placement)
    }

    /// Stop treating a thread as part of a ranked partition without moving it
    pub fn demote(&mut self, id: ThreadId) {
        if self.partitions.contains_key(&id) {
            self.partitions.insert(id, Partition::Plain);
        }
    }

    /// Move a row from the main list to the end of the hidden sublist
    pub fn move_to_hidden(&mut self, id: ThreadId) {
        if let Some(pos) = self.position(id) {
            self.entries.remove(pos);
        }
        self.partitions.remove(&id);
        if !self.hidden.contains(&id) {
            self.hidden.push(id);
        }
    }

    /// Move a row from the hidden sublist back to the end of the main list
    pub fn restore(&mut self, id: ThreadId) -> Placement {
        self.hidden.retain(|hidden| *hidden != id);
        if let Some(pos) = self.position(id) {
            self.entries.remove(pos);
        }
        self.entries.push(ListEntry::Thread(id));
        self.partitions.insert(id, Partition::Plain);
        Placement::End
    }
}
