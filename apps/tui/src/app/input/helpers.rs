pub const fn wrap_decrement(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    if index == 0 || index >= len {
        len - 1
    } else {
        index - 1
    }
}

pub const fn wrap_increment(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    (index + 1) % len
}

/// Position of `current` in `order`, or the first entry when it is missing.
pub fn position_or_first<T: PartialEq>(order: &[T], current: &T) -> usize {
    order.iter().position(|item| item == current).unwrap_or(0)
}
