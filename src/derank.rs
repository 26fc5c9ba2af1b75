// Arg-min over the handful of siblings of a d-ary heap node.
//
// Siblings are compared in a knock-out tournament rather than a left-to-right
// fold. The comparisons within a round don't depend on each other, which lets
// the CPU overlap them.

/// Core comparison and index selection
///
/// Ties go to the left, so the earliest minimum wins.
#[inline(always)]
#[must_use]
fn fight<T: PartialOrd>(a: &[T], l: usize, r: usize) -> usize {
    if a[l] <= a[r] { l } else { r }
}

// 0   1 2   3 4   5 6   7
// *   * *   * *   * *   *
//  \ /   \ /   \ /   \ /
//   *     *     *     *
//    \   /       \   /
//      *           *
//        \        /
//            *
/// Index of the minimum element of a non-empty slice.
///
/// ```
/// use puzzle_search::derank::derank;
/// assert_eq!(derank(&[3, 1, 2]), 1);
/// assert_eq!(derank(&[7, 5, 5, 9, 8, 6, 5, 7]), 1);
/// ```
#[inline(always)]
#[must_use]
pub fn derank<T: PartialOrd>(a: &[T]) -> usize {
    debug_assert!(!a.is_empty(), "No winner without contenders");

    match a.len() {
        1 => 0,
        2 => fight(a, 0, 1),
        3 => fight(a, fight(a, 0, 1), 2),
        4 => fight(a, fight(a, 0, 1), fight(a, 2, 3)),
        n => {
            // Split so the left half is a power of two, keeping the bracket
            // balanced for full sibling groups.
            let half = n.next_power_of_two() / 2;
            let l = derank(&a[..half]);
            let r = derank(&a[half..]) + half;
            fight(a, l, r)
        }
    }
}
