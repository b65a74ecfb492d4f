/// Dataset cursor for the dashboard.
///
/// The navigator owns exactly two numbers: the zero-based index of the
/// selected dataset and the last known dataset count. Every transition is a
/// pure function of those two numbers plus one input, so the paging logic
/// can be exercised without a backend or a renderer.
///
/// # Invariant
///
/// - `total > 0` → `index < total`
/// - `total == 0` → `index == 0` (no valid selection)
use serde::Serialize;

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Zero-based cursor into the ordered dataset sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    index: usize,
    total: usize,
}

impl Navigator {
    /// A navigator with no datasets (`0 / 0`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Last known dataset count.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether a dataset is selectable at all.
    pub fn has_selection(&self) -> bool {
        self.total > 0
    }

    /// Overwrite the total, clamping the index into range.
    ///
    /// Returns `true` when the effective index changed, which callers use to
    /// decide whether the detail view is now out of date.
    pub fn set_total(&mut self, total: usize) -> bool {
        self.total = total;
        if self.index >= total {
            let clamped = total.saturating_sub(1);
            let changed = clamped != self.index;
            self.index = clamped;
            return changed;
        }
        false
    }

    /// Move one dataset forward. No-op at the last dataset.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.total {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Move one dataset back. No-op at the first dataset.
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `index`, clamped to the last dataset. Returns whether the
    /// index changed; always `false` when there is nothing to select.
    pub fn select(&mut self, index: usize) -> bool {
        if self.total == 0 {
            return false;
        }
        let target = index.min(self.total - 1);
        let changed = target != self.index;
        self.index = target;
        changed
    }

    /// Counter label and button enablement for the current state.
    pub fn control_state(&self) -> ControlState {
        ControlState::of(self.index, self.total)
    }
}

// ---------------------------------------------------------------------------
// Control state
// ---------------------------------------------------------------------------

/// What the paging controls should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub label: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl ControlState {
    /// Derive the control state from a raw `(index, total)` pair.
    pub fn of(index: usize, total: usize) -> Self {
        let label = if total == 0 {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", index.saturating_add(1), total)
        };

        Self {
            label,
            prev_enabled: index > 0,
            next_enabled: index.saturating_add(1) < total,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn at(index: usize, total: usize) -> Navigator {
        let mut nav = Navigator::new();
        nav.set_total(total);
        for _ in 0..index {
            assert!(nav.next());
        }
        nav
    }

    #[test]
    fn new_navigator_is_empty() {
        let nav = Navigator::new();
        assert_eq!(nav.index(), 0);
        assert_eq!(nav.total(), 0);
        assert!(!nav.has_selection());
    }

    #[test]
    fn growing_total_keeps_index() {
        let mut nav = at(2, 3);
        assert!(!nav.set_total(10));
        assert_eq!(nav.index(), 2);
    }

    #[test]
    fn shrinking_to_zero_resets_index() {
        let mut nav = at(3, 4);
        assert!(nav.set_total(0));
        assert_eq!(nav.index(), 0);
        assert_eq!(nav.control_state().label, "0 / 0");
    }

    #[test]
    fn clamp_from_zero_index_reports_no_change() {
        let mut nav = at(0, 4);
        assert!(!nav.set_total(0));
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn next_stops_at_last() {
        let mut nav = at(1, 2);
        assert!(!nav.next());
        assert_eq!(nav.index(), 1);
    }

    #[test]
    fn empty_navigator_refuses_both_directions() {
        let mut nav = Navigator::new();
        assert!(!nav.next());
        assert!(!nav.previous());
        let state = nav.control_state();
        assert!(!state.prev_enabled);
        assert!(!state.next_enabled);
    }

    #[test]
    fn select_clamps_to_last_dataset() {
        let mut nav = at(0, 4);
        assert!(nav.select(99));
        assert_eq!(nav.index(), 3);
        assert!(!nav.select(3));
        assert!(nav.select(1));
        assert_eq!(nav.index(), 1);
    }

    #[test]
    fn select_on_empty_is_refused() {
        let mut nav = Navigator::new();
        assert!(!nav.select(2));
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn control_state_middle_of_range() {
        let state = ControlState::of(2, 5);
        assert_eq!(state.label, "3 / 5");
        assert!(state.prev_enabled);
        assert!(state.next_enabled);
    }

    #[test]
    fn control_state_at_largest_index_does_not_overflow() {
        let state = ControlState::of(usize::MAX, usize::MAX);
        assert_eq!(state.label, format!("{} / {}", usize::MAX, usize::MAX));
        assert!(state.prev_enabled);
        assert!(!state.next_enabled);
    }
}
