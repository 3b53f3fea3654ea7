//! Task board: the generated plan grouped by status.

use crate::core::{sort_tasks, ProcessedTask, TaskStatus};

/// Column order on the board.
pub const COLUMNS: [TaskStatus; 3] =
    [TaskStatus::InProgress, TaskStatus::Pending, TaskStatus::Completed];

/// Sorted tasks with a selection cursor.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<ProcessedTask>,
    selected: usize,
}

impl TaskBoard {
    pub fn new(mut tasks: Vec<ProcessedTask>) -> Self {
        sort_tasks(&mut tasks);
        Self { tasks, selected: 0 }
    }

    /// Tasks in display order: by column, then by `order`.
    pub fn ordered(&self) -> Vec<&ProcessedTask> {
        COLUMNS.iter().flat_map(|status| self.column(*status)).collect()
    }

    /// Tasks with the given status, sorted by `order`.
    pub fn column(&self, status: TaskStatus) -> Vec<&ProcessedTask> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_task(&self) -> Option<&ProcessedTask> {
        self.ordered().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        if !self.tasks.is_empty() {
            self.selected = (self.selected + 1) % self.tasks.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.tasks.is_empty() {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.tasks.len() - 1);
        }
    }

    /// Select by task id. Returns false if no such task exists.
    pub fn select_id(&mut self, id: &str) -> bool {
        match self.ordered().iter().position(|t| t.id == id) {
            Some(pos) => {
                self.selected = pos;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: TaskStatus, order: i64) -> ProcessedTask {
        ProcessedTask {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            status,
            order,
        }
    }

    fn board() -> TaskBoard {
        TaskBoard::new(vec![
            task("OMN-3", TaskStatus::Pending, 3),
            task("OMN-1", TaskStatus::Pending, 1),
            task("OMN-2", TaskStatus::InProgress, 2),
            task("OMN-4", TaskStatus::Completed, 0),
        ])
    }

    #[test]
    fn test_columns_are_sorted() {
        let board = board();
        let todo: Vec<_> = board.column(TaskStatus::Pending).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(todo, vec!["OMN-1", "OMN-3"]);

        let ordered: Vec<_> = board.ordered().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ordered, vec!["OMN-2", "OMN-1", "OMN-3", "OMN-4"]);
    }

    #[test]
    fn test_selection_wraps() {
        let mut board = board();
        assert_eq!(board.selected_task().map(|t| t.id.as_str()), Some("OMN-2"));

        board.select_previous();
        assert_eq!(board.selected_task().map(|t| t.id.as_str()), Some("OMN-4"));
        board.select_next();
        assert_eq!(board.selected_index(), 0);
    }

    #[test]
    fn test_select_id() {
        let mut board = board();
        assert!(board.select_id("OMN-3"));
        assert_eq!(board.selected_index(), 2);
        assert!(!board.select_id("missing"));
    }

    #[test]
    fn test_empty_board() {
        let mut board = TaskBoard::default();
        board.select_next();
        board.select_previous();
        assert!(board.is_empty());
        assert!(board.selected_task().is_none());
    }
}
