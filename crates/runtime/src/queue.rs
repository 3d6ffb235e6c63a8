//! Cursor-based task queue.
//!
//! The queue is a single vector with a cursor. Everything before the cursor is
//! history, everything at or after it is still to run. Dequeuing a task that
//! must be replayed after an interruption only advances the cursor; any other
//! task is removed outright, so history only ever holds replayable tasks.
//!
//! # Invariants
//!
//! - `cursor <= tasks.len()`
//! - The active task is never stored in `tasks` unless it is replayable, in
//!   which case it sits just before the cursor.
use quest_core::Task;

#[derive(Clone, Debug, Default)]
pub struct TaskQueue {
    tasks: Vec<Task>,
    cursor: usize,
    active: Option<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn enqueue_all<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = Task>,
    {
        self.tasks.extend(tasks);
    }

    /// Takes the task at the cursor and makes it the active task.
    pub fn dequeue(&mut self) -> Option<Task> {
        if self.cursor >= self.tasks.len() {
            return None;
        }

        let task = if self.tasks[self.cursor].redo_on_interrupt() {
            let task = self.tasks[self.cursor].clone();
            self.cursor += 1;
            task
        } else {
            self.tasks.remove(self.cursor)
        };

        self.active = Some(task.clone());
        Some(task)
    }

    pub fn peek(&self) -> Option<&Task> {
        self.tasks.get(self.cursor)
    }

    /// Tasks still to run, in order.
    pub fn remaining(&self) -> &[Task] {
        &self.tasks[self.cursor..]
    }

    /// Replayable tasks that already ran.
    pub fn completed(&self) -> &[Task] {
        &self.tasks[..self.cursor]
    }

    pub fn active(&self) -> Option<&Task> {
        self.active.as_ref()
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Preempts the active task with `tasks`.
    ///
    /// The remaining work becomes `tasks ++ [active] ++ remaining`; history is
    /// dropped and the active slot cleared, so the interrupted task restarts
    /// from scratch once the inserted tasks are done.
    pub fn interrupt_with<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = Task>,
    {
        let remaining = self.tasks.split_off(self.cursor);
        self.tasks.clear();
        self.tasks.extend(tasks);
        if let Some(active) = self.active.take() {
            self.tasks.push(active);
        }
        self.tasks.extend(remaining);
        self.cursor = 0;
    }

    /// Splices `tasks` in front of the remaining work.
    pub fn insert_next<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = Task>,
    {
        let at = self.cursor;
        self.tasks.splice(at..at, tasks);
    }

    pub fn reset(&mut self) {
        self.tasks.clear();
        self.cursor = 0;
        self.active = None;
    }

    /// Stored tasks, history included.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when nothing is left to dequeue.
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use quest_core::{DataId, Interact, MoveTo, Position, QuestId, StepRef};

    use super::*;

    fn move_to(x: f32) -> Task {
        Task::Move(MoveTo::new(Position::new(x, 0.0, 0.0), 1.0))
    }

    fn interact(id: u32) -> Task {
        Task::Interact(Interact::new(DataId(id)))
    }

    fn next_step() -> Task {
        Task::NextStep(StepRef::new(QuestId(1), 1, 0))
    }

    #[test]
    fn replayable_tasks_stay_in_history() {
        let mut queue = TaskQueue::new();
        queue.enqueue_all([move_to(1.0), interact(10), next_step()]);

        assert_eq!(queue.dequeue(), Some(move_to(1.0)));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.cursor(), 1);
        assert_eq!(queue.completed(), &[move_to(1.0)]);

        assert_eq!(queue.dequeue(), Some(interact(10)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.cursor(), 1);
        assert_eq!(queue.remaining(), &[next_step()]);
    }

    #[test]
    fn dequeue_length_rule_holds_for_every_task() {
        let tasks = vec![
            move_to(1.0),
            Task::Mount,
            Task::Unmount,
            interact(3),
            Task::Delay(Duration::from_secs(1)),
            Task::interruption_fight(),
            Task::SkipMarker,
            next_step(),
        ];
        let mut queue = TaskQueue::new();
        queue.enqueue_all(tasks);

        loop {
            let (len, cursor) = (queue.len(), queue.cursor());
            let Some(task) = queue.dequeue() else {
                break;
            };
            if task.redo_on_interrupt() {
                assert_eq!(queue.len(), len);
                assert_eq!(queue.cursor(), cursor + 1);
            } else {
                assert_eq!(queue.len(), len - 1);
                assert_eq!(queue.cursor(), cursor);
            }
            assert_eq!(queue.active(), Some(&task));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn interrupt_splices_before_active_task() {
        let mut queue = TaskQueue::new();
        queue.enqueue_all([move_to(1.0), interact(10), interact(11), next_step()]);
        queue.dequeue();
        let active = queue.dequeue();
        assert_eq!(active, Some(interact(10)));
        let old_remaining = queue.remaining().to_vec();

        let inserted = vec![Task::Unmount, Task::Delay(Duration::from_secs(1))];
        queue.interrupt_with(inserted.clone());

        let mut expected = inserted;
        expected.push(interact(10));
        expected.extend(old_remaining);
        assert_eq!(queue.remaining(), expected.as_slice());
        assert!(queue.active().is_none());
        assert!(queue.completed().is_empty());
    }

    #[test]
    fn interrupt_replays_active_replayable_task_once() {
        let mut queue = TaskQueue::new();
        queue.enqueue_all([move_to(1.0), next_step()]);
        queue.dequeue();

        queue.interrupt_with([Task::Delay(Duration::from_secs(1))]);

        assert_eq!(
            queue.remaining(),
            &[Task::Delay(Duration::from_secs(1)), move_to(1.0), next_step()]
        );
    }

    #[test]
    fn interrupt_without_active_task_only_inserts() {
        let mut queue = TaskQueue::new();
        queue.enqueue(next_step());
        queue.interrupt_with([Task::Unmount]);
        assert_eq!(queue.remaining(), &[Task::Unmount, next_step()]);
    }

    #[test]
    fn insert_next_runs_before_remaining() {
        let mut queue = TaskQueue::new();
        queue.enqueue_all([move_to(1.0), interact(10), next_step()]);
        queue.dequeue();
        queue.dequeue();

        queue.insert_next([move_to(5.0), interact(10)]);
        assert_eq!(queue.remaining(), &[move_to(5.0), interact(10), next_step()]);
        assert_eq!(queue.peek(), Some(&move_to(5.0)));
    }

    #[test]
    fn reset_clears_everything() {
        let mut queue = TaskQueue::new();
        queue.enqueue_all([move_to(1.0), next_step()]);
        queue.dequeue();
        queue.reset();
        assert_eq!(queue.len(), 0);
        assert!(queue.active().is_none());
        assert!(queue.dequeue().is_none());
    }
}
