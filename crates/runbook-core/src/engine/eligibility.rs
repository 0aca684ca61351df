use crate::models::{Step, StepStatus};

/// Finds the sibling occupying `step_order`.
pub fn find_by_order(steps: &[Step], step_order: u32) -> Option<&Step> {
    steps.iter().find(|step| step.step_order == step_order)
}

/// Whether an operator may act on `step` given the rest of its task.
///
/// Finished steps are never actionable and an in-progress step always is
/// (it awaits confirmation). A pending step is actionable once every
/// dependency resolves to a completed sibling; a dependency that matches no
/// sibling keeps it blocked.
pub fn can_execute(step: &Step, siblings: &[Step]) -> bool {
    match step.status {
        StepStatus::Completed | StepStatus::Failed | StepStatus::Skipped => false,
        StepStatus::InProgress => true,
        StepStatus::Pending => step.dependencies.iter().all(|order| {
            find_by_order(siblings, *order)
                .is_some_and(|dependency| dependency.status == StepStatus::Completed)
        }),
    }
}
