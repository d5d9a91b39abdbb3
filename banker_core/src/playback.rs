//! Step-by-step playback over a recorded simulation.
//!
//! [`PlaybackController`] owns the snapshot list and a cursor. Renderers ask
//! it for the current step and, when moving forward onto a completion step,
//! for the [`Transition`] to animate (grant the request, then return every
//! instance the process held).

use crate::resources::ResourceVector;
use crate::safety::Step;

/// Resource movement for a forward move onto a completion step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Process that ran
    pub process: usize,

    /// Step index the move started from
    pub from: usize,

    /// Step index the move landed on
    pub to: usize,

    /// Instances handed to the process (its satisfied need)
    pub granted: ResourceVector,

    /// Instances handed back: prior allocation plus the grant
    pub returned: ResourceVector,
}

/// Cursor over a list of [`Step`]s.
#[derive(Debug, Clone, Default)]
pub struct PlaybackController {
    steps: Vec<Step>,
    current: usize,
}

impl PlaybackController {
    /// Creates an idle controller with no steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the step list and rewinds to the first step.
    pub fn load(&mut self, steps: Vec<Step>) {
        self.steps = steps;
        self.current = 0;
    }

    /// Drops all steps.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.current = 0;
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Step> {
        self.steps.get(self.current)
    }

    /// The step before the cursor, used for change annotations.
    pub fn previous(&self) -> Option<&Step> {
        self.current
            .checked_sub(1)
            .and_then(|i| self.steps.get(i))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// True on the last step, or when idle.
    pub fn is_at_end(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    /// `"k/N"` with a 1-based `k`; `"0"` when idle.
    pub fn position_label(&self) -> String {
        if self.steps.is_empty() {
            "0".to_string()
        } else {
            format!("{}/{}", self.current + 1, self.steps.len())
        }
    }

    /// Moves the cursor to `index`.
    ///
    /// Out-of-range indices are ignored. Returns a transition only for a
    /// forward move that lands on a completion step.
    pub fn show(&mut self, index: usize) -> Option<Transition> {
        if index >= self.steps.len() {
            return None;
        }

        let from = self.current;
        self.current = index;

        let next = &self.steps[index];
        if index <= from || !next.completed {
            return None;
        }

        let prev = &self.steps[from];
        let granted = next
            .requested
            .clone()
            .unwrap_or_else(|| ResourceVector::zeros(next.available.len()));
        let returned = prev
            .allocation
            .row(next.process)
            .map(|held| held.plus(&granted))
            .unwrap_or_else(|| granted.clone());

        Some(Transition {
            process: next.process,
            from,
            to: index,
            granted,
            returned,
        })
    }

    /// Advances one step; no-op on the last step.
    pub fn next(&mut self) -> Option<Transition> {
        if self.is_at_end() {
            return None;
        }
        self.show(self.current + 1)
    }

    /// Moves back one step; no-op on the first step.
    pub fn prev(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }
}

/// Signed per-cell change of the allocation matrix from `prev` to `next`.
pub fn allocation_delta(prev: &Step, next: &Step) -> Vec<Vec<i64>> {
    next.allocation
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, &now)| {
                    let before = prev
                        .allocation
                        .row(i)
                        .and_then(|r| r.get(j))
                        .unwrap_or(now);
                    i64::from(now) - i64::from(before)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Matrix;
    use crate::safety::simulate;

    fn loaded() -> PlaybackController {
        let allocation = Matrix::from(vec![vec![1, 0], vec![0, 2]]);
        let max = Matrix::from(vec![vec![2, 1], vec![0, 3]]);
        let report = simulate(&allocation, &max, &ResourceVector::from(vec![1, 1])).unwrap();

        let mut playback = PlaybackController::new();
        playback.load(report.steps);
        playback
    }

    #[test]
    fn test_idle_controller() {
        let playback = PlaybackController::new();

        assert_eq!(playback.total(), 0);
        assert!(playback.current().is_none());
        assert!(playback.is_at_end());
        assert_eq!(playback.position_label(), "0");
    }

    #[test]
    fn test_forward_onto_completion_yields_transition() {
        let mut playback = loaded();
        assert_eq!(playback.position_label(), "1/4");

        let transition = playback.next().unwrap();

        assert_eq!(transition.process, 0);
        assert_eq!((transition.from, transition.to), (0, 1));
        assert_eq!(transition.granted, ResourceVector::from(vec![1, 1]));
        assert_eq!(transition.returned, ResourceVector::from(vec![2, 1]));
        assert_eq!(playback.position_label(), "2/4");
    }

    #[test]
    fn test_forward_onto_before_step_has_no_transition() {
        let mut playback = loaded();
        playback.next();

        assert!(playback.next().is_none());
        assert_eq!(playback.current_index(), 2);
        assert_eq!(playback.current().map(|s| s.process), Some(1));
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut playback = loaded();

        playback.prev();
        assert_eq!(playback.current_index(), 0);

        for _ in 0..10 {
            playback.next();
        }
        assert_eq!(playback.current_index(), 3);
        assert!(playback.next().is_none());
        assert_eq!(playback.current_index(), 3);
    }

    #[test]
    fn test_backward_show_has_no_transition() {
        let mut playback = loaded();
        playback.show(3);

        assert!(playback.show(1).is_none());
        assert_eq!(playback.current_index(), 1);
        assert!(playback.show(99).is_none());
        assert_eq!(playback.current_index(), 1);
    }

    #[test]
    fn test_reset_clears_steps() {
        let mut playback = loaded();
        playback.next();

        playback.reset();

        assert_eq!(playback.total(), 0);
        assert_eq!(playback.current_index(), 0);
    }

    #[test]
    fn test_allocation_delta_marks_release() {
        let playback = loaded();
        let steps = playback.steps();

        let delta = allocation_delta(&steps[0], &steps[1]);

        assert_eq!(delta, vec![vec![-1, 0], vec![0, 0]]);
    }
}
