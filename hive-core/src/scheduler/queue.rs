//! Pending task buffer
//!
//! Ordering rules:
//! - `push` appends; `priority = high` inserts at the head instead.
//! - `pop_next` stably re-sorts everything pending by descending agent rank
//!   (unknown agents last) and takes the head, so equal ranks keep their
//!   insertion order.

use std::cmp::Reverse;
use std::collections::VecDeque;

use hive_types::Task;

#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        if task.priority.is_high() {
            self.pending.push_front(task);
        } else {
            self.pending.push_back(task);
        }
    }

    /// Push several tasks as one unit, keeping their relative order
    pub fn push_batch(&mut self, tasks: Vec<Task>) {
        let (high, normal): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(|task| task.priority.is_high());
        for task in high.into_iter().rev() {
            self.pending.push_front(task);
        }
        self.pending.extend(normal);
    }

    /// Re-sort by rank and pop the head
    pub fn pop_next<F>(&mut self, rank_of: F) -> Option<Task>
    where
        F: Fn(&str) -> Option<u32>,
    {
        // slice::sort_by_key 是稳定排序
        self.pending
            .make_contiguous()
            .sort_by_key(|task| Reverse(rank_of(&task.target_agent)));
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(id: &str) -> Option<u32> {
        match id {
            "overseer" => Some(10),
            "architect" => Some(9),
            "archivist" => Some(7),
            "builder" => Some(5),
            _ => None,
        }
    }

    fn drain(queue: &mut TaskQueue) -> Vec<Task> {
        std::iter::from_fn(|| queue.pop_next(ranks)).collect()
    }

    #[test]
    fn test_high_priority_jumps_ahead_of_same_rank() {
        let mut queue = TaskQueue::new();
        let t1 = Task::new("builder", "build_area");
        let t2 = Task::new("builder", "populate_area").high_priority();
        queue.push(t1.clone());
        queue.push(t2.clone());

        let order = drain(&mut queue);
        assert_eq!(order[0].id, t2.id);
        assert_eq!(order[1].id, t1.id);
    }

    #[test]
    fn test_rank_order() {
        let mut queue = TaskQueue::new();
        queue.push(Task::new("archivist", "process_content"));
        queue.push(Task::new("architect", "design_mechanics"));
        queue.push(Task::new("overseer", "plan"));

        let agents: Vec<String> = drain(&mut queue)
            .into_iter()
            .map(|t| t.target_agent)
            .collect();
        assert_eq!(agents, ["overseer", "architect", "archivist"]);
    }

    #[test]
    fn test_equal_ranks_keep_insertion_order() {
        let mut queue = TaskQueue::new();
        let first = Task::new("builder", "build_area");
        let second = Task::new("builder", "populate_area");
        let third = Task::new("builder", "build_area");
        queue.push(first.clone());
        queue.push(second.clone());
        queue.push(third.clone());
        // a higher-rank arrival does not disturb the tie
        queue.push(Task::new("overseer", "plan"));

        let ids: Vec<String> = drain(&mut queue).into_iter().map(|t| t.id).collect();
        assert_eq!(ids[1..], [first.id, second.id, third.id]);
    }

    #[test]
    fn test_unknown_agents_sort_last() {
        let mut queue = TaskQueue::new();
        queue.push(Task::new("ghost", "haunt"));
        queue.push(Task::new("builder", "build_area"));

        let agents: Vec<String> = drain(&mut queue)
            .into_iter()
            .map(|t| t.target_agent)
            .collect();
        assert_eq!(agents, ["builder", "ghost"]);
    }

    #[test]
    fn test_batch_keeps_relative_order() {
        let mut queue = TaskQueue::new();
        queue.push(Task::new("builder", "existing"));
        queue.push_batch(vec![
            Task::new("builder", "a"),
            Task::new("builder", "urgent-1").high_priority(),
            Task::new("builder", "b"),
            Task::new("builder", "urgent-2").high_priority(),
        ]);

        let actions: Vec<String> = drain(&mut queue).into_iter().map(|t| t.action).collect();
        assert_eq!(actions, ["urgent-1", "urgent-2", "existing", "a", "b"]);
    }
}
