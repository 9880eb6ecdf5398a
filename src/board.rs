use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::task::TaskStatus;

// One (task, status, position) tuple of a reorder commit. Also the wire
// shape of the bulk-position-update request entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: i32,
    pub status: TaskStatus,
    pub position: i32,
}

// In-memory view of a workspace board: one ordered column per status,
// plus the committed (status, position) of every task so a move can be
// reduced to the minimal change set.
#[derive(Debug)]
pub struct Board {
    columns: HashMap<TaskStatus, Vec<i32>>,
    committed: HashMap<i32, (TaskStatus, i32)>,
    current: HashMap<i32, TaskStatus>,
}

impl Board {
    pub fn new<I>(cards: I) -> Self
    where
        I: IntoIterator<Item = (i32, TaskStatus, i32)>,
    {
        let mut committed = HashMap::new();
        let mut current = HashMap::new();
        let mut sortable: HashMap<TaskStatus, Vec<(i32, i32)>> = HashMap::new();

        for (id, status, position) in cards {
            committed.insert(id, (status, position));
            current.insert(id, status);
            sortable.entry(status).or_default().push((position, id));
        }

        // Sort by position, ties broken by task id (insertion order)
        let columns = sortable
            .into_iter()
            .map(|(status, mut column)| {
                column.sort();
                (status, column.into_iter().map(|(_, id)| id).collect())
            })
            .collect();

        Board {
            columns,
            committed,
            current,
        }
    }

    pub fn column(&self, status: TaskStatus) -> &[i32] {
        self.columns.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    // Apply a drag of `task_id` to `to_index` within the `to_status` column
    // and return the tuples whose (status, position) changed relative to
    // the committed state. Returns None when the task is not on the board.
    // An out-of-range index is clamped to the column length.
    pub fn move_task(
        &mut self,
        task_id: i32,
        to_status: TaskStatus,
        to_index: usize,
    ) -> Option<Vec<PositionUpdate>> {
        let from_status = *self.current.get(&task_id)?;

        let from_column = self.columns.get_mut(&from_status)?;
        let from_index = from_column.iter().position(|&id| id == task_id)?;
        from_column.remove(from_index);

        let to_column = self.columns.entry(to_status).or_default();
        let insert_at = to_index.min(to_column.len());
        to_column.insert(insert_at, task_id);
        self.current.insert(task_id, to_status);

        let mut changes = Vec::new();
        self.collect_column_changes(to_status, &mut changes);
        if from_status != to_status {
            self.collect_column_changes(from_status, &mut changes);
        }
        Some(changes)
    }

    // Reindex a column to contiguous zero-based positions and emit a tuple
    // for every task that no longer matches its committed slot.
    fn collect_column_changes(&self, status: TaskStatus, changes: &mut Vec<PositionUpdate>) {
        let column = match self.columns.get(&status) {
            Some(column) => column,
            None => return,
        };
        for (index, &id) in column.iter().enumerate() {
            let position = index as i32;
            match self.committed.get(&id) {
                Some(&(committed_status, committed_position))
                    if committed_status == status && committed_position == position => {}
                _ => changes.push(PositionUpdate {
                    id,
                    status,
                    position,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus::{Backlog, Done, Todo};

    fn change_map(changes: &[PositionUpdate]) -> HashMap<i32, (TaskStatus, i32)> {
        changes
            .iter()
            .map(|c| (c.id, (c.status, c.position)))
            .collect()
    }

    // After a move, every affected column must be a contiguous ascending
    // run starting at 0 with no duplicate slots.
    fn assert_contiguous(board: &Board, cards: &[(i32, TaskStatus, i32)], changes: &[PositionUpdate]) {
        let overlay = change_map(changes);
        for &status in &[Backlog, Todo, Done] {
            let mut positions: Vec<i32> = cards
                .iter()
                .map(|&(id, s, p)| overlay.get(&id).copied().unwrap_or((s, p)))
                .filter(|&(s, _)| s == status)
                .map(|(_, p)| p)
                .collect();
            positions.sort();
            let expected: Vec<i32> = (0..positions.len() as i32).collect();
            assert_eq!(positions, expected, "column {:?} is not contiguous", status);
        }
        // The in-memory view itself must agree with the overlay ordering
        for &status in &[Backlog, Todo, Done] {
            assert_eq!(
                board.column(status).len(),
                cards
                    .iter()
                    .filter(|&&(id, s, _)| overlay.get(&id).map(|&(ns, _)| ns).unwrap_or(s) == status)
                    .count()
            );
        }
    }

    #[test]
    fn cross_column_move_closes_and_opens_gaps() {
        // TODO: A(0), B(1), C(2); move B to DONE at index 0
        let cards = [(1, Todo, 0), (2, Todo, 1), (3, Todo, 2)];
        let mut board = Board::new(cards);

        let changes = board.move_task(2, Done, 0).unwrap();
        let map = change_map(&changes);

        assert_eq!(map[&2], (Done, 0));
        assert_eq!(map[&3], (Todo, 1));
        // A keeps its committed slot and is not resent
        assert!(!map.contains_key(&1));
        assert_eq!(board.column(Todo), &[1, 3]);
        assert_eq!(board.column(Done), &[2]);
        assert_contiguous(&board, &cards, &changes);
    }

    #[test]
    fn reorder_within_a_column() {
        // TODO: A(0), B(1), C(2); move A to index 2
        let cards = [(1, Todo, 0), (2, Todo, 1), (3, Todo, 2)];
        let mut board = Board::new(cards);

        let changes = board.move_task(1, Todo, 2).unwrap();
        let map = change_map(&changes);

        assert_eq!(map[&1], (Todo, 2));
        assert_eq!(map[&2], (Todo, 0));
        assert_eq!(map[&3], (Todo, 1));
        assert_eq!(board.column(Todo), &[2, 3, 1]);
        assert_contiguous(&board, &cards, &changes);
    }

    #[test]
    fn dropping_into_the_current_slot_is_a_no_op() {
        let cards = [(1, Todo, 0), (2, Todo, 1), (3, Todo, 2)];
        let mut board = Board::new(cards);

        let changes = board.move_task(2, Todo, 1).unwrap();
        assert!(changes.is_empty());
        assert_eq!(board.column(Todo), &[1, 2, 3]);
    }

    #[test]
    fn dropping_at_the_end_appends() {
        let cards = [(1, Todo, 0), (2, Todo, 1), (4, Done, 0)];
        let mut board = Board::new(cards);

        let changes = board.move_task(4, Todo, 2).unwrap();
        let map = change_map(&changes);

        assert_eq!(map[&4], (Todo, 2));
        assert_eq!(map.len(), 1);
        assert_eq!(board.column(Todo), &[1, 2, 4]);
        assert_eq!(board.column(Done), &[] as &[i32]);
    }

    #[test]
    fn out_of_range_index_is_clamped_to_column_length() {
        let cards = [(1, Todo, 0), (2, Done, 0)];
        let mut board = Board::new(cards);

        let changes = board.move_task(1, Done, 99).unwrap();
        let map = change_map(&changes);

        assert_eq!(map[&1], (Done, 1));
        assert_eq!(board.column(Done), &[2, 1]);
        assert_contiguous(&board, &cards, &changes);
    }

    #[test]
    fn moving_into_an_empty_column_needs_no_special_case() {
        let cards = [(1, Backlog, 0)];
        let mut board = Board::new(cards);

        let changes = board.move_task(1, Done, 0).unwrap();
        let map = change_map(&changes);

        assert_eq!(map[&1], (Done, 0));
        assert_eq!(board.column(Backlog), &[] as &[i32]);
        assert_eq!(board.column(Done), &[1]);
    }

    #[test]
    fn unknown_task_is_rejected() {
        let mut board = Board::new([(1, Todo, 0)]);
        assert!(board.move_task(99, Done, 0).is_none());
    }

    #[test]
    fn sparse_committed_positions_are_compacted_on_move() {
        // Positions 3, 7, 9 from an older client still order correctly and
        // come out contiguous after any move touches the column.
        let cards = [(1, Todo, 3), (2, Todo, 7), (3, Todo, 9)];
        let mut board = Board::new(cards);

        let changes = board.move_task(3, Todo, 0).unwrap();
        let map = change_map(&changes);

        assert_eq!(map[&3], (Todo, 0));
        assert_eq!(map[&1], (Todo, 1));
        assert_eq!(map[&2], (Todo, 2));
        assert_eq!(board.column(Todo), &[3, 1, 2]);
    }

    #[test]
    fn position_ties_fall_back_to_task_id_order() {
        let cards = [(5, Todo, 0), (2, Todo, 0), (9, Todo, 0)];
        let board = Board::new(cards);
        assert_eq!(board.column(Todo), &[2, 5, 9]);
    }
}
