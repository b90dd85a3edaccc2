//! Dense 0..n-1 ordering for a container of items.
//!
//! Every helper here leaves the container's `order` fields equal to the items'
//! positions. Both the tree's modules and each module's lessons go through it.

use crate::error::{CurriculumError, CurriculumResult};

/// An item that lives in an ordered container.
pub trait Ordered {
    /// Stable identity, independent of position.
    fn id(&self) -> &str;
    /// Current order index.
    fn order(&self) -> u32;
    /// Overwrites the order index.
    fn set_order(&mut self, order: u32);
}

/// Moves the item at `from` to `to` and re-densifies the container.
///
/// The moved item ends up at index `to`; items in between shift by one.
/// `from == to` is a valid no-op.
pub fn reorder<T: Ordered>(items: &mut Vec<T>, from: usize, to: usize) -> CurriculumResult<()> {
    let length = items.len();
    if from >= length {
        return Err(CurriculumError::index_out_of_range(from, length));
    }
    if to >= length {
        return Err(CurriculumError::index_out_of_range(to, length));
    }
    if from == to {
        return Ok(());
    }

    let item = items.remove(from);
    items.insert(to, item);
    renumber(items);
    Ok(())
}

/// Assigns every item its positional index.
pub fn renumber<T: Ordered>(items: &mut [T]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.set_order(i as u32);
    }
}

/// Inserts `item` at `index`, clamped to `[0, len]`, and re-densifies.
/// Returns the index the item landed at.
pub fn insert_clamped<T: Ordered>(items: &mut Vec<T>, index: Option<usize>, item: T) -> usize {
    let at = index.map_or(items.len(), |i| i.min(items.len()));
    items.insert(at, item);
    renumber(items);
    at
}

/// Removes the item with `id` and re-densifies. Returns `None` (and leaves the
/// container untouched) if no item has that id.
pub fn remove_by_id<T: Ordered>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let index = position(items, id)?;
    let item = items.remove(index);
    renumber(items);
    Some(item)
}

/// Index of the item with `id`.
pub fn position<T: Ordered>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Sorts by the incoming `order` (stable, so ties keep payload order) and
/// re-densifies. Used when a container arrives from outside the engine.
pub fn normalize<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.order());
    renumber(items);
}

/// Returns true if the order fields are exactly `0..len` in sequence.
pub fn is_dense<T: Ordered>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, item)| item.order() as usize == i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        order: u32,
    }

    impl Ordered for Item {
        fn id(&self) -> &str {
            &self.id
        }
        fn order(&self) -> u32 {
            self.order
        }
        fn set_order(&mut self, order: u32) {
            self.order = order;
        }
    }

    fn items(ids: &[&str]) -> Vec<Item> {
        let mut v: Vec<Item> = ids
            .iter()
            .map(|id| Item {
                id: id.to_string(),
                order: 0,
            })
            .collect();
        renumber(&mut v);
        v
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_reorder_forward() {
        let mut v = items(&["a", "b", "c", "d"]);
        reorder(&mut v, 0, 2).unwrap();
        assert_eq!(ids(&v), vec!["b", "c", "a", "d"]);
        assert!(is_dense(&v));
    }

    #[test]
    fn test_reorder_backward() {
        let mut v = items(&["a", "b", "c", "d"]);
        reorder(&mut v, 3, 1).unwrap();
        assert_eq!(ids(&v), vec!["a", "d", "b", "c"]);
        assert!(is_dense(&v));
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let mut v = items(&["a", "b", "c"]);
        let before = v.clone();
        reorder(&mut v, 1, 1).unwrap();
        assert_eq!(v, before);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut v = items(&["a", "b"]);
        let err = reorder(&mut v, 0, 2).unwrap_err();
        assert!(matches!(
            err,
            CurriculumError::IndexOutOfRange {
                index: 2,
                length: 2
            }
        ));
        assert_eq!(ids(&v), vec!["a", "b"]);

        let mut empty: Vec<Item> = Vec::new();
        assert!(reorder(&mut empty, 0, 0).is_err());
    }

    #[test]
    fn test_insert_clamped() {
        let mut v = items(&["a", "b"]);
        let at = insert_clamped(&mut v, Some(99), Item { id: "z".into(), order: 7 });
        assert_eq!(at, 2);
        assert_eq!(ids(&v), vec!["a", "b", "z"]);
        assert!(is_dense(&v));

        let at = insert_clamped(&mut v, Some(0), Item { id: "y".into(), order: 0 });
        assert_eq!(at, 0);
        assert_eq!(ids(&v), vec!["y", "a", "b", "z"]);
        assert!(is_dense(&v));
    }

    #[test]
    fn test_remove_by_id() {
        let mut v = items(&["a", "b", "c"]);
        let removed = remove_by_id(&mut v, "b").unwrap();
        assert_eq!(removed.id, "b");
        assert_eq!(ids(&v), vec!["a", "c"]);
        assert!(is_dense(&v));

        assert!(remove_by_id(&mut v, "missing").is_none());
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_normalize_sorts_and_densifies() {
        let mut v = vec![
            Item { id: "c".into(), order: 9 },
            Item { id: "a".into(), order: 1 },
            Item { id: "b".into(), order: 4 },
        ];
        normalize(&mut v);
        assert_eq!(ids(&v), vec!["a", "b", "c"]);
        assert!(is_dense(&v));
    }
}
