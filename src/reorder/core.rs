use crate::error::{BuilderError, Result};

/// Return a copy of `items` with the element at `from` moved to `to`.
///
/// Splice semantics: remove at `from`, then insert at `to` in the shortened
/// list. Both indices must be `< len`.
pub fn reorder<T: Clone>(items: &[T], from: usize, to: usize) -> Result<Vec<T>> {
    let mut out = items.to_vec();
    reorder_in_place(&mut out, from, to)?;
    Ok(out)
}

pub fn reorder_in_place<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(BuilderError::IndexOutOfRange { index, len });
        }
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Convert a "drop before slot" position (`0..=len`) into a target index for
/// [`reorder`]. Dropping below the dragged item shifts the slot up by one
/// because the item leaves its old place first.
pub fn drop_index(drag: usize, drop_slot: usize) -> usize {
    if drop_slot > drag {
        drop_slot - 1
    } else {
        drop_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABCD: [char; 4] = ['A', 'B', 'C', 'D'];

    fn s(items: &[char]) -> String {
        items.iter().collect()
    }

    #[test]
    fn fixtures() {
        let cases = [
            (0, 2, "BCAD"),
            (2, 0, "CABD"),
            (3, 0, "DABC"),
            (0, 3, "BCDA"),
            (1, 1, "ABCD"),
            (1, 2, "ACBD"),
        ];
        for (from, to, expected) in cases {
            assert_eq!(s(&reorder(&ABCD, from, to).unwrap()), expected, "{from} -> {to}");
        }
    }

    #[test]
    fn inverse_move_restores_order() {
        for from in 0..4 {
            for to in 0..4 {
                let moved = reorder(&ABCD, from, to).unwrap();
                assert_eq!(reorder(&moved, to, from).unwrap(), ABCD.to_vec());
            }
        }
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(matches!(
            reorder(&ABCD, 4, 0),
            Err(BuilderError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert!(matches!(
            reorder(&ABCD, 0, 4),
            Err(BuilderError::IndexOutOfRange { index: 4, len: 4 })
        ));
        let empty: [char; 0] = [];
        assert!(reorder(&empty, 0, 0).is_err());
    }

    #[test]
    fn in_place_matches_copying_variant() {
        let mut items = ABCD.to_vec();
        reorder_in_place(&mut items, 3, 1).unwrap();
        assert_eq!(s(&items), "ADBC");
    }

    #[test]
    fn drop_slots_map_to_targets() {
        // dragging A to the slot before C lands between B and C
        let to = drop_index(0, 2);
        assert_eq!(to, 1);
        assert_eq!(s(&reorder(&ABCD, 0, to).unwrap()), "BACD");
        // slot after the last element
        assert_eq!(s(&reorder(&ABCD, 1, drop_index(1, 4)).unwrap()), "ACDB");
        // upward drags keep the slot
        assert_eq!(s(&reorder(&ABCD, 3, drop_index(3, 0)).unwrap()), "DABC");
        assert_eq!(drop_index(2, 2), 2);
    }
}
