use super::can_execute;
use crate::{
    flows,
    models::{Step, StepStatus, TodoAction, TodoItem, TodoPriority},
};

/// Minutes budgeted for acknowledging an in-progress step.
pub const CONFIRM_ESTIMATE_MINUTES: u32 = 2;

/// Computes the operator's work items for one task.
///
/// Every unblocked pending step yields an `operate` item and every
/// in-progress step a `confirm` item, so independent flow types can be
/// worked in parallel. Items follow step_order, which keeps each flow type's
/// band together.
pub fn build_todo_list(task_id: u64, steps: &[Step]) -> Vec<TodoItem> {
    let mut ordered: Vec<&Step> = steps.iter().collect();
    ordered.sort_by_key(|step| step.step_order);

    let mut todos = Vec::new();
    for step in ordered {
        match step.status {
            StepStatus::Pending if can_execute(step, steps) => {
                todos.push(todo_item(task_id, step, TodoAction::Operate));
            }
            StepStatus::InProgress => {
                todos.push(todo_item(task_id, step, TodoAction::Confirm));
            }
            _ => {}
        }
    }
    todos
}

fn todo_item(task_id: u64, step: &Step, action: TodoAction) -> TodoItem {
    let (flow_label, flow_icon) = flows::flow_label(&step.flow_type);
    let (id, title, description, priority, estimated_time) = match action {
        TodoAction::Operate => (
            format!("step-{}", step.id),
            step.step_name.clone(),
            format!("Run {}", step.step_name),
            TodoPriority::High,
            step.estimated_duration.unwrap_or(0),
        ),
        TodoAction::Confirm => (
            format!("confirm-{}", step.id),
            format!("Confirm: {}", step.step_name),
            format!("Confirm that {} has finished", step.step_name),
            TodoPriority::Medium,
            CONFIRM_ESTIMATE_MINUTES,
        ),
    };

    TodoItem {
        id,
        title,
        description,
        flow_type: step.flow_type.clone(),
        flow_label,
        flow_icon,
        priority,
        estimated_time,
        action,
        step_id: step.id,
        task_id,
    }
}
