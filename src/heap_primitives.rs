// Index arithmetic for implicit d-ary heaps.
//
// The heap lives in an array and its tree shape is implied by the indices.
// With arity `A`, node `i` has children `A*i + 1 ..= A*(i + 1)`.
//
// ```text
// A = 2                      0
//              1                         2
//       3            4            5             6
//   7      8      9     10    11     12     13     14
// ```
//
// The last level is often incomplete, so children indices must be checked
// against the heap length.

/// The parent node
///
/// ```
/// use puzzle_search::heap_primitives::index_parent;
/// assert_eq!(index_parent::<2>(1), 0);
/// assert_eq!(index_parent::<2>(2), 0);
/// assert_eq!(index_parent::<2>(6), 2);
/// assert_eq!(index_parent::<8>(8), 0);
/// assert_eq!(index_parent::<8>(9), 1);
/// assert_eq!(index_parent::<8>(72), 8);
/// ```
#[inline(always)]
#[must_use]
pub fn index_parent<const A: usize>(i: usize) -> usize {
    debug_assert!(i > 0, "The root has no parent");
    (i - 1) / A
}

/// The first child
///
/// ```
/// use puzzle_search::heap_primitives::index_first_children;
/// assert_eq!(index_first_children::<2>(0), 1);
/// assert_eq!(index_first_children::<2>(3), 7);
/// assert_eq!(index_first_children::<8>(0), 1);
/// assert_eq!(index_first_children::<8>(1), 9);
/// ```
#[inline(always)]
#[must_use]
pub fn index_first_children<const A: usize>(i: usize) -> usize {
    (A * i) + 1
}

/// The children range, clamped to a heap of `len` elements.
///
/// ```
/// use puzzle_search::heap_primitives::index_children;
/// assert_eq!(index_children::<8>(0, 100), 1..9);
/// assert_eq!(index_children::<8>(1, 12), 9..12);
/// assert!(index_children::<8>(2, 12).is_empty());
/// ```
#[inline(always)]
#[must_use]
pub fn index_children<const A: usize>(i: usize, len: usize) -> std::ops::Range<usize> {
    let first = index_first_children::<A>(i);
    first.min(len)..(first + A).min(len)
}
