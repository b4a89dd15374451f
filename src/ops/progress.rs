use std::collections::HashMap;

use crate::model::item::{ActionItem, ItemStatus};
use crate::model::map::ActionMap;
use crate::model::task::Task;

/// Completed/total counts plus the derived percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rollup {
    pub total: u32,
    pub completed: u32,
    /// 0–100
    pub rate: u8,
}

/// `round_half_up(completed / total × 100)`, clamped to 0–100; 0 when total is 0.
///
/// Integer arithmetic throughout: a float path misrounds exact halves whose
/// ratio has no binary representation (23/40 is exactly 57.5% but the double
/// lands just below it).
pub fn rate(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let scaled = (completed as u64 * 200 + total as u64) / (2 * total as u64);
    scaled.min(100) as u8
}

/// Roll up one item from its linked tasks.
///
/// Only the item-held `linked_task_ids` set drives the rollup — task-side
/// back-references are ignored. Ids that do not resolve in the snapshot are
/// skipped, the same read-time tolerance the tree builder applies to corrupt
/// parent references.
pub fn item_rollup(item: &ActionItem, tasks_by_id: &HashMap<&str, &Task>) -> Rollup {
    let mut total = 0u32;
    let mut completed = 0u32;
    for task_id in &item.linked_task_ids {
        let Some(task) = tasks_by_id.get(task_id.as_str()) else {
            continue;
        };
        total += 1;
        if task.status.is_done() {
            completed += 1;
        }
    }
    Rollup {
        total,
        completed,
        rate: rate(completed, total),
    }
}

/// Roll up a map from its flat item set.
///
/// Every item of the map counts as one member regardless of nesting depth;
/// an item is completed when its status is done.
pub fn map_rollup(items: &[ActionItem]) -> Rollup {
    let total = items.len() as u32;
    let completed = items
        .iter()
        .filter(|item| item.status == ItemStatus::Done)
        .count() as u32;
    Rollup {
        total,
        completed,
        rate: rate(completed, total),
    }
}

/// Index tasks by id for rollup lookups
pub fn tasks_by_id(tasks: &[Task]) -> HashMap<&str, &Task> {
    tasks.iter().map(|task| (task.id.as_str(), task)).collect()
}

/// Recompute the derived fields of every item from the task snapshot.
///
/// Pure function of its inputs — running it twice on the same snapshot writes
/// the same numbers twice.
pub fn recompute_items(items: &mut [ActionItem], tasks: &[Task]) {
    let lookup = tasks_by_id(tasks);
    for item in items.iter_mut() {
        let rollup = item_rollup(item, &lookup);
        item.task_count = rollup.total;
        item.completed_task_count = rollup.completed;
        item.progress_rate = rollup.rate;
    }
}

/// Recompute the derived fields of a map from its item set
pub fn recompute_map(map: &mut ActionMap, items: &[ActionItem]) {
    let rollup = map_rollup(items);
    map.item_count = rollup.total;
    map.completed_item_count = rollup.completed;
    map.progress_rate = rollup.rate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Suit, TaskStatus};

    fn task(id: &str, status: TaskStatus) -> Task {
        let mut t = Task::new(id, format!("task {id}"), Suit::Spade);
        t.status = status;
        t
    }

    fn item_with_tasks(id: &str, task_ids: &[&str]) -> ActionItem {
        let mut it = ActionItem::new(id, "map-1", format!("item {id}"));
        it.linked_task_ids = task_ids.iter().map(|s| s.to_string()).collect();
        it
    }

    #[test]
    fn rate_rounds_half_up_and_clamps() {
        assert_eq!(rate(0, 0), 0);
        assert_eq!(rate(1, 3), 33);
        assert_eq!(rate(2, 3), 67);
        assert_eq!(rate(1, 2), 50);
        assert_eq!(rate(1, 8), 13); // 12.5 rounds up
        assert_eq!(rate(7, 7), 100);
        assert_eq!(rate(9, 7), 100); // corrupt counts still clamp
    }

    #[test]
    fn rate_rounds_half_up_on_non_binary_halves() {
        // Exact .5 percentages whose ratio is not binary-representable; a
        // float path lands just under the half and rounds down.
        assert_eq!(rate(23, 40), 58); // 57.5
        assert_eq!(rate(29, 200), 15); // 14.5
        assert_eq!(rate(3, 40), 8); // 7.5
        assert_eq!(rate(1, 200), 1); // 0.5
    }

    #[test]
    fn three_of_four_tasks_is_seventy_five() {
        let tasks = vec![
            task("t1", TaskStatus::Done),
            task("t2", TaskStatus::Done),
            task("t3", TaskStatus::Done),
            task("t4", TaskStatus::InProgress),
        ];
        let item = item_with_tasks("a", &["t1", "t2", "t3", "t4"]);
        let rollup = item_rollup(&item, &tasks_by_id(&tasks));
        assert_eq!(rollup.total, 4);
        assert_eq!(rollup.completed, 3);
        assert_eq!(rollup.rate, 75);
    }

    #[test]
    fn no_linked_tasks_means_zero_rate() {
        let item = item_with_tasks("a", &[]);
        let rollup = item_rollup(&item, &HashMap::new());
        assert_eq!(rollup, Rollup::default());
    }

    #[test]
    fn dangling_task_ids_are_skipped() {
        let tasks = vec![task("t1", TaskStatus::Done)];
        let item = item_with_tasks("a", &["t1", "gone"]);
        let rollup = item_rollup(&item, &tasks_by_id(&tasks));
        assert_eq!(rollup.total, 1);
        assert_eq!(rollup.completed, 1);
        assert_eq!(rollup.rate, 100);
    }

    #[test]
    fn map_rollup_is_flat_over_nested_items() {
        let mut parent = ActionItem::new("p", "map-1", "parent");
        parent.status = ItemStatus::Done;
        let mut child = ActionItem::new("c", "map-1", "child");
        child.parent_item_id = Some("p".into());
        child.status = ItemStatus::InProgress;

        // Nested or not, both count as independent members: 1 of 2 done
        let rollup = map_rollup(&[parent, child]);
        assert_eq!(rollup.total, 2);
        assert_eq!(rollup.completed, 1);
        assert_eq!(rollup.rate, 50);
    }

    #[test]
    fn recompute_is_idempotent() {
        let tasks = vec![task("t1", TaskStatus::Done), task("t2", TaskStatus::NotStarted)];
        let mut items = vec![item_with_tasks("a", &["t1", "t2"])];
        let mut map = ActionMap::new("map-1", "plan");

        recompute_items(&mut items, &tasks);
        recompute_map(&mut map, &items);
        let first_items = items.clone();
        let first_map = map.clone();

        recompute_items(&mut items, &tasks);
        recompute_map(&mut map, &items);
        assert_eq!(items, first_items);
        assert_eq!(map, first_map);
        assert_eq!(items[0].progress_rate, 50);
    }

    #[test]
    fn rates_stay_in_bounds() {
        for total in 0..=20u32 {
            for completed in 0..=total {
                let r = rate(completed, total);
                assert!(r <= 100);
                if total == 0 {
                    assert_eq!(r, 0);
                }
            }
        }
    }
}
