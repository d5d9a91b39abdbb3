//! Plain-text rendering of simulation steps.
//!
//! Mirrors what the visualizer draws for one step:
//! - header with the step counter and the executed process
//! - instances held per process, grouped by resource letter
//! - allocation matrix annotated with changes since the previous step
//! - need matrix, available and work vectors

use banker_core::{allocation_delta, ResourceVector, Step, Transition, Units};
use std::fmt;

/// Longest run of dots drawn for one count; larger counts get a numeric suffix.
pub const MAX_DOTS: Units = 20;

/// Letter for resource `j`: A, B, C, ...
pub fn resource_label(j: usize) -> String {
    let letter = (b'A' + (j % 26) as u8) as char;
    if j < 26 {
        letter.to_string()
    } else {
        format!("{}{}", letter, j / 26)
    }
}

/// `●●●` for small counts, `●●…●…(N)` once `count` exceeds [`MAX_DOTS`].
pub fn dots(count: Units) -> String {
    if count <= MAX_DOTS {
        "●".repeat(count as usize)
    } else {
        format!("{}…({})", "●".repeat(MAX_DOTS as usize), count)
    }
}

/// Renders `step` (index `index` of `total`), diffing against `prev`.
pub fn render_step(step: &Step, prev: Option<&Step>, index: usize, total: usize) -> String {
    StepView {
        step,
        prev,
        index,
        total,
    }
    .to_string()
}

/// Text view of one step.
struct StepView<'a> {
    step: &'a Step,
    prev: Option<&'a Step>,
    index: usize,
    total: usize,
}

impl fmt::Display for StepView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = self.step;
        let m = step.available.len();

        writeln!(f, "Step {}/{}", self.index + 1, self.total)?;
        writeln!(
            f,
            "Process Executed: P{} (Max Required: {})",
            step.process,
            step.max_required()
        )?;

        writeln!(f)?;
        writeln!(f, "Instances Held per Process (per Resource)")?;
        let header: Vec<String> = (0..m).map(|j| format!("{:<8}", resource_label(j))).collect();
        writeln!(f, "      {}", header.join(" ").trim_end())?;
        for (i, row) in step.allocation.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|&count| format!("{:<8}", dots(count))).collect();
            writeln!(f, "  P{}: {}", i, cells.join(" ").trim_end())?;
        }

        writeln!(f)?;
        writeln!(f, "Available Instances")?;
        for (j, &count) in step.available.iter().enumerate() {
            if count == 0 {
                writeln!(f, "  Resource {}: (none)", resource_label(j))?;
            } else {
                writeln!(f, "  Resource {}: {}", resource_label(j), dots(count))?;
            }
        }

        let delta = self.prev.map(|p| allocation_delta(p, step));
        writeln!(f)?;
        writeln!(f, "Allocation Matrix")?;
        for (i, row) in step.allocation.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(j, &value)| {
                    let d = delta
                        .as_ref()
                        .and_then(|d| d.get(i))
                        .and_then(|r| r.get(j))
                        .copied()
                        .unwrap_or(0);
                    annotate(value, d)
                })
                .collect();
            writeln!(f, "  P{}: [{}]", i, cells.join(", "))?;
        }

        writeln!(f, "Need Matrix")?;
        for (i, row) in step.need.iter().enumerate() {
            writeln!(f, "  P{}: {}", i, row)?;
        }

        writeln!(f)?;
        writeln!(f, "Available: {}", step.available)?;
        writeln!(f, "Work: {}", step.work)?;

        if let Some(requested) = &step.requested {
            writeln!(f, "Requested: {}", requested)?;
        }
        if step.completed {
            writeln!(f, "Process P{} completed and released resources.", step.process)?;
        }
        Ok(())
    }
}

/// One-line description of a resource transfer.
pub fn render_transition(transition: &Transition) -> String {
    format!(
        "P{}: granted {} from the pool, then released {} (step {} -> {})",
        transition.process,
        transition.granted,
        transition.returned,
        transition.from + 1,
        transition.to + 1
    )
}

/// `3(+1)`, `0(-2)` or plain `3`.
fn annotate(value: Units, delta: i64) -> String {
    match delta {
        d if d > 0 => format!("{}(+{})", value, d),
        d if d < 0 => format!("{}({})", value, d),
        _ => value.to_string(),
    }
}

/// Compact one-line summary of a vector per resource letter.
pub fn labelled(vector: &ResourceVector) -> String {
    vector
        .iter()
        .enumerate()
        .map(|(j, v)| format!("{}={}", resource_label(j), v))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioId;
    use banker_core::PlaybackController;

    #[test]
    fn test_resource_labels() {
        assert_eq!(resource_label(0), "A");
        assert_eq!(resource_label(2), "C");
        assert_eq!(resource_label(27), "B1");
    }

    #[test]
    fn test_render_first_textbook_step() {
        let report = ScenarioId::Textbook.problem().solve().unwrap();

        let text = render_step(&report.steps[0], None, 0, report.steps.len());

        assert!(text.starts_with("Step 1/10\n"));
        assert!(text.contains("Process Executed: P1 (Max Required: [3, 2, 2])"));
        assert!(text.contains("  P1: [2, 0, 0]"));
        assert!(text.contains("Work: [3, 3, 2]"));
        assert!(!text.contains("completed"));
    }

    #[test]
    fn test_render_completion_annotates_release() {
        let report = ScenarioId::Textbook.problem().solve().unwrap();

        let text = render_step(&report.steps[1], Some(&report.steps[0]), 1, 10);

        assert!(text.contains("  P1: [0(-2), 0, 0]"));
        assert!(text.contains("Requested: [1, 2, 2]"));
        assert!(text.contains("Process P1 completed and released resources."));
    }

    #[test]
    fn test_render_transition() {
        let report = ScenarioId::Trivial.problem().solve().unwrap();
        let mut playback = PlaybackController::new();
        playback.load(report.steps);

        let transition = playback.next().unwrap();

        assert_eq!(
            render_transition(&transition),
            "P0: granted [0, 0] from the pool, then released [2, 1] (step 1 -> 2)"
        );
    }

    #[test]
    fn test_dots_are_capped() {
        assert_eq!(dots(0), "");
        assert_eq!(dots(3), "●●●");
        assert_eq!(dots(MAX_DOTS), "●".repeat(20));
        assert_eq!(dots(21), format!("{}…(21)", "●".repeat(20)));
    }

    #[test]
    fn test_render_huge_counts_stays_small() {
        let big = Units::MAX;
        let problem = crate::Problem::new(
            banker_core::Matrix::from(vec![vec![big]]),
            banker_core::Matrix::from(vec![vec![big]]),
            ResourceVector::from(vec![0]),
        );
        let report = problem.solve().unwrap();

        let first = render_step(&report.steps[0], None, 0, report.steps.len());
        let last = render_step(&report.steps[1], Some(&report.steps[0]), 1, report.steps.len());

        assert!(first.len() < 1024, "rendered {} bytes", first.len());
        assert!(last.len() < 1024, "rendered {} bytes", last.len());
        assert!(first.contains(&format!("…({})", big)));
        assert!(last.contains(&format!("  Resource A: {}…({})", "●".repeat(20), big)));
    }

    #[test]
    fn test_labelled_vector() {
        assert_eq!(labelled(&ResourceVector::from(vec![3, 3, 2])), "A=3 B=3 C=2");
    }
}
