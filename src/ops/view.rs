use indexmap::IndexMap;

use crate::model::item::{ActionItem, ItemStatus};

/// Status-partitioned board projection: one column per status, in the fixed
/// order not_started → in_progress → blocked → done.
pub type StatusBoard<'a> = IndexMap<ItemStatus, Vec<&'a ActionItem>>;

/// Partition items by status without mutating the source.
///
/// All four columns are always present, even when empty, and each column
/// preserves `sort_order` (ties broken by id). The board is a pure projection
/// — moving a card is an ordinary versioned `status` write on the item, not
/// board state.
pub fn status_board(items: &[ActionItem]) -> StatusBoard<'_> {
    let mut board: StatusBoard<'_> = ItemStatus::ALL
        .iter()
        .map(|&status| (status, Vec::new()))
        .collect();

    let mut ordered: Vec<&ActionItem> = items.iter().collect();
    ordered.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));

    for item in ordered {
        if let Some(column) = board.get_mut(&item.status) {
            column.push(item);
        }
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, status: ItemStatus, sort_order: i64) -> ActionItem {
        let mut it = ActionItem::new(id, "map-1", format!("item {id}"));
        it.status = status;
        it.sort_order = sort_order;
        it
    }

    #[test]
    fn empty_board_still_has_all_columns() {
        let board = status_board(&[]);
        let statuses: Vec<ItemStatus> = board.keys().copied().collect();
        assert_eq!(statuses, ItemStatus::ALL);
        assert!(board.values().all(|column| column.is_empty()));
    }

    #[test]
    fn items_land_in_their_status_column() {
        let items = vec![
            item("a", ItemStatus::Done, 0),
            item("b", ItemStatus::NotStarted, 0),
            item("c", ItemStatus::Done, 1),
            item("d", ItemStatus::Blocked, 0),
        ];
        let board = status_board(&items);
        let ids = |status: ItemStatus| -> Vec<&str> {
            board[&status].iter().map(|it| it.id.as_str()).collect()
        };
        assert_eq!(ids(ItemStatus::NotStarted), vec!["b"]);
        assert_eq!(ids(ItemStatus::InProgress), Vec::<&str>::new());
        assert_eq!(ids(ItemStatus::Blocked), vec!["d"]);
        assert_eq!(ids(ItemStatus::Done), vec!["a", "c"]);
    }

    #[test]
    fn columns_preserve_sort_order_with_id_tiebreak() {
        let items = vec![
            item("z", ItemStatus::InProgress, 2),
            item("m", ItemStatus::InProgress, 1),
            item("a", ItemStatus::InProgress, 2),
        ];
        let board = status_board(&items);
        let ids: Vec<&str> = board[&ItemStatus::InProgress]
            .iter()
            .map(|it| it.id.as_str())
            .collect();
        assert_eq!(ids, vec!["m", "a", "z"]);
    }

    #[test]
    fn projection_does_not_mutate_items() {
        let items = vec![item("a", ItemStatus::Blocked, 3)];
        let before = items.clone();
        let _ = status_board(&items);
        assert_eq!(items, before);
    }
}
