use jiff::Timestamp;

use super::{can_execute, find_by_order};
use crate::{
    error::{Result, RunbookError},
    models::{Step, StepStatus, TaskStatus, UpdateStepRequest},
};

/// The step state machine.
///
/// `pending` may move to `in_progress`, straight to `completed` (one-click
/// complete) or to `skipped`; `in_progress` may move to `completed` or
/// `failed`. Re-applying the current status is always allowed.
pub fn next_status_is_allowed(from: StepStatus, to: StepStatus) -> bool {
    from == to
        || matches!(
            (from, to),
            (
                StepStatus::Pending,
                StepStatus::InProgress | StepStatus::Completed | StepStatus::Skipped
            ) | (
                StepStatus::InProgress,
                StepStatus::Completed | StepStatus::Failed
            )
        )
}

/// Validates moving `step` to `to`, including dependency eligibility.
pub fn check_step_transition(step: &Step, to: StepStatus, siblings: &[Step]) -> Result<()> {
    if step.status == to {
        return Ok(());
    }

    if !next_status_is_allowed(step.status, to) {
        return Err(RunbookError::invalid_input("status").with_reason(format!(
            "Step '{}' cannot move from {} to {}",
            step.step_name,
            step.status.as_str(),
            to.as_str()
        )));
    }

    let starts_work = matches!(to, StepStatus::InProgress | StepStatus::Completed);
    if step.status == StepStatus::Pending && starts_work && !can_execute(step, siblings) {
        let blocking: Vec<String> = step
            .dependencies
            .iter()
            .filter(|order| {
                find_by_order(siblings, **order)
                    .map_or(true, |dependency| dependency.status != StepStatus::Completed)
            })
            .map(u32::to_string)
            .collect();
        return Err(RunbookError::invalid_input("status").with_reason(format!(
            "Step '{}' is blocked until step(s) {} are completed",
            step.step_name,
            blocking.join(", ")
        )));
    }

    Ok(())
}

/// Whole minutes from `start` to `end`, `None` when `end` precedes `start`.
pub fn minutes_between(start: Timestamp, end: Timestamp) -> Option<u32> {
    let seconds = end.as_second() - start.as_second();
    (seconds >= 0).then(|| (seconds / 60) as u32)
}

/// Applies an operator's update to a copy of `step`.
///
/// Entering `in_progress` stamps `start_time` unless one is already set;
/// entering `completed` or `failed` stamps `end_time`. Explicit times in the
/// request win over the stamps. A finished step with both times known gets
/// its `actual_duration` recomputed.
pub fn apply_step_update(
    step: &Step,
    siblings: &[Step],
    request: &UpdateStepRequest,
    now: Timestamp,
) -> Result<Step> {
    let mut updated = step.clone();

    if let Some(status) = request.status {
        check_step_transition(step, status, siblings)?;
        if status != step.status {
            match status {
                StepStatus::InProgress => {
                    updated.start_time = updated.start_time.or(Some(now));
                }
                StepStatus::Completed | StepStatus::Failed => updated.end_time = Some(now),
                StepStatus::Pending | StepStatus::Skipped => {}
            }
            updated.status = status;
        }
    }

    if let Some(notes) = &request.notes {
        updated.notes = Some(notes.clone()).filter(|notes| !notes.trim().is_empty());
    }
    if let Some(start_time) = request.start_time {
        updated.start_time = Some(start_time);
    }
    if let Some(end_time) = request.end_time {
        updated.end_time = Some(end_time);
    }

    if matches!(updated.status, StepStatus::Completed | StepStatus::Failed) {
        if let (Some(start), Some(end)) = (updated.start_time, updated.end_time) {
            updated.actual_duration = minutes_between(start, end);
        }
    }

    Ok(updated)
}

/// The auto-complete rule: a task whose steps are all completed is complete.
///
/// Returns `current` unchanged when there are no steps or any step is not
/// `completed` (a skipped step therefore keeps the task open).
pub fn recompute_task_status(current: TaskStatus, steps: &[Step]) -> TaskStatus {
    let all_completed = !steps.is_empty()
        && steps
            .iter()
            .all(|step| step.status == StepStatus::Completed);
    if all_completed {
        TaskStatus::Completed
    } else {
        current
    }
}

/// Validates an explicit operator status change on a task.
///
/// Finished tasks keep their status, and completion is only reached through
/// the auto-complete rule or force completion.
pub fn check_task_transition(from: TaskStatus, to: TaskStatus) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if to == TaskStatus::Completed {
        return Err(RunbookError::invalid_input("status").with_reason(
            "Tasks complete automatically when every step is completed; use force-complete to override",
        ));
    }
    if from.is_finished() {
        return Err(RunbookError::invalid_input("status").with_reason(format!(
            "Task is already {} and cannot move to {}",
            from.as_str(),
            to.as_str()
        )));
    }
    Ok(())
}
