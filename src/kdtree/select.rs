//! Quickselect: find the value of a given rank in linear average time.

/// Reorder `values` so that the value of rank `k` sits at index `k`, everything before it is not
/// greater and everything after it is not smaller, and return that value.
///
/// Uses the last element of the active range as pivot. Average time is linear, the worst case is
/// quadratic.
///
/// # Panics
///
/// Panics if `k >= values.len()`.
pub(crate) fn select<T: PartialOrd + Copy>(values: &mut [T], k: usize) -> T {
    assert!(k < values.len(), "rank {k} out of bounds for {} values", values.len());

    let mut left = 0;
    let mut right = values.len();
    while right - left > 1 {
        let p = left + partition(&mut values[left..right]);
        if p == k {
            break;
        }
        if k < p {
            right = p;
        } else {
            left = p + 1;
        }
    }
    values[k]
}

/// Partition `values` around its last element and return the pivot's final index.
///
/// Values equal to the pivot may end up on either side.
fn partition<T: PartialOrd + Copy>(values: &mut [T]) -> usize {
    let last = values.len() - 1;
    let pivot = values[last];

    let mut i = 0;
    let mut j = last;
    loop {
        while i < last && values[i] < pivot {
            i += 1;
        }
        while j > i && pivot < values[j - 1] {
            j -= 1;
        }
        if j == 0 || i + 1 >= j {
            break;
        }
        values.swap(i, j - 1);
        i += 1;
        j -= 1;
    }
    values.swap(i, last);
    i
}
