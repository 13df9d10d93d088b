use crate::process::{Process, ProcessState, Time};
use std::collections::VecDeque;

/// One priority level of the feedback queue.
///
/// Entries are slots into the scheduler's process table; the queue never
/// owns a process.
#[derive(Debug, Clone)]
pub struct LevelQueue {
    level: usize,
    quantum: Time,
    entries: VecDeque<usize>,
}

impl LevelQueue {
    pub fn new(level: usize, quantum: Time) -> Self {
        LevelQueue {
            level,
            quantum,
            entries: VecDeque::new(),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn quantum(&self) -> Time {
        self.quantum
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots in queue order, head first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = usize> + ExactSizeIterator + '_ {
        self.entries.iter().copied()
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.entries.contains(&slot)
    }

    /// Tags the process with this level, marks it ready and appends it.
    pub fn enqueue(&mut self, slot: usize, process: &mut Process) {
        self.adopt(process);
        self.entries.push_back(slot);
    }

    /// Like `enqueue` but places the slot at `pos` (clamped to the tail).
    pub fn insert(&mut self, pos: usize, slot: usize, process: &mut Process) {
        self.adopt(process);
        let pos = pos.min(self.entries.len());
        self.entries.insert(pos, slot);
    }

    pub fn dequeue(&mut self) -> Option<usize> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<usize> {
        self.entries.front().copied()
    }

    pub fn remove_at(&mut self, pos: usize) -> Option<usize> {
        self.entries.remove(pos)
    }

    /// Removes `slot` wherever it sits; the rest keep their order.
    pub fn remove(&mut self, slot: usize) -> bool {
        match self.entries.iter().position(|&s| s == slot) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn adopt(&self, process: &mut Process) {
        process.set_priority(self.level);
        process.set_state(ProcessState::Ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize) -> Vec<Process> {
        (0..n).map(|i| Process::new(i + 1, 0, 10 * (i as Time + 1))).collect()
    }

    #[test]
    fn enqueue_dequeue_is_fifo() {
        let mut procs = table(2);
        let mut queue = LevelQueue::new(0, 4);
        assert!(queue.is_empty());

        queue.enqueue(0, &mut procs[0]);
        assert_eq!(queue.len(), 1);
        queue.enqueue(1, &mut procs[1]);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.peek(), Some(0));
        assert_eq!(queue.dequeue(), Some(0));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.peek(), None);
    }

    #[test]
    fn enqueue_tags_level_and_state() {
        let mut procs = table(1);
        let mut queue = LevelQueue::new(2, 16);
        queue.enqueue(0, &mut procs[0]);
        assert_eq!(procs[0].priority(), 2);
        assert_eq!(procs[0].state(), ProcessState::Ready);
    }

    #[test]
    fn remove_preserves_order() {
        let mut procs = table(4);
        let mut queue = LevelQueue::new(0, 4);
        for (slot, p) in procs.iter_mut().enumerate() {
            queue.enqueue(slot, p);
        }

        assert!(queue.remove(1));
        assert!(!queue.remove(1));
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![0, 2, 3]);
    }

    #[test]
    fn insert_clamps_to_tail() {
        let mut procs = table(3);
        let mut queue = LevelQueue::new(1, 8);
        queue.enqueue(0, &mut procs[0]);
        queue.insert(0, 1, &mut procs[1]);
        queue.insert(99, 2, &mut procs[2]);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![1, 0, 2]);
        assert_eq!(procs[2].priority(), 1);
    }
}
