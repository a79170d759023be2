/// Resolve an inclusive rank range against a set of `len` members.
///
/// Negative ranks count from the end (`-1` is the last member) and
/// out-of-range ranks are clamped. Returns `(offset, count)` for the members
/// that fall inside the range, or `None` when the range selects nothing.
pub fn rank_window(len: i64, start: i64, stop: i64) -> Option<(i64, i64)> {
  if len <= 0 {
    return None;
  }

  let start = if start < 0 { (len + start).max(0) } else { start };
  let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

  if start > stop || start >= len {
    return None;
  }

  Some((start, stop - start + 1))
}
