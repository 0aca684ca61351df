//! Display implementations for domain models.
//!
//! All output is markdown; the CLI renders it with termimad and MCP tools
//! return it verbatim.

use std::fmt;

use super::datetime::{LocalDateTime, Minutes};
use crate::{
    flows,
    models::{
        FlowTypeInfo, HistoryRecord, Message, MessageType, Service, ServiceType, Step,
        StepStatus, StepType, Task, TaskStatus, TaskSummary, TemplateStep, TodoAction, TodoItem,
        TodoPriority,
    },
};

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TodoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoAction::Operate => write!(f, "operate"),
            TodoAction::Confirm => write!(f, "confirm"),
        }
    }
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoPriority::High => write!(f, "high"),
            TodoPriority::Medium => write!(f, "medium"),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        writeln!(
            f,
            "- Progress: {}/{} steps completed",
            self.completed_steps(),
            self.steps.len()
        )?;
        let flow_types = self.flow_types();
        if !flow_types.is_empty() {
            let labels: Vec<String> = flow_types
                .iter()
                .map(|flow_type| {
                    let (label, icon) = flows::flow_label(flow_type);
                    format!("{icon} {label}")
                })
                .collect();
            writeln!(f, "- Flows: {}", labels.join(", "))?;
        }
        if let Some(start) = &self.start_time {
            writeln!(f, "- Started: {}", LocalDateTime(start))?;
        }
        if let Some(end) = &self.end_time {
            writeln!(f, "- Finished: {}", LocalDateTime(end))?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if self.steps.is_empty() {
            writeln!(f, "\nNo steps in this task.")?;
            return Ok(());
        }

        let mut current_flow: Option<&str> = None;
        for step in &self.steps {
            if current_flow != Some(step.flow_type.as_str()) {
                let (label, icon) = flows::flow_label(&step.flow_type);
                writeln!(f, "\n## {icon} {label}")?;
                writeln!(f)?;
                current_flow = Some(step.flow_type.as_str());
            }
            write!(f, "{step}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.step_order,
            self.step_name,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Type: {}", self.step_type)?;
        if !self.dependencies.is_empty() {
            let orders: Vec<String> = self.dependencies.iter().map(u32::to_string).collect();
            writeln!(f, "- After: {}", orders.join(", "))?;
        }
        if let Some(estimate) = self.estimated_duration {
            writeln!(f, "- Estimated: {}", Minutes(estimate.into()))?;
        }
        if let Some(actual) = self.actual_duration {
            writeln!(f, "- Actual: {}", Minutes(actual.into()))?;
        }
        if let Some(start) = &self.start_time {
            writeln!(f, "- Started: {}", LocalDateTime(start))?;
        }
        if let Some(end) = &self.end_time {
            writeln!(f, "- Finished: {}", LocalDateTime(end))?;
        }
        writeln!(f)?;

        if let Some(notes) = &self.notes {
            writeln!(f, "{notes}")?;
            writeln!(f)?;
        }

        if !self.links.is_empty() {
            writeln!(f, "#### Links")?;
            writeln!(f)?;
            for link in &self.links {
                writeln!(f, "- [{}]({})", link.name, link.url)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for TaskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} (ID: {}) [{}] ({}/{})",
            self.name, self.id, self.status, self.completed_steps, self.total_steps
        )?;
        writeln!(f)?;

        if let Some(desc) = &self.description {
            writeln!(f, "- **Description**: {desc}")?;
        }
        if let Some(start) = &self.start_time {
            writeln!(f, "- **Started**: {}", LocalDateTime(start))?;
        }
        if let Some(end) = &self.end_time {
            writeln!(f, "- **Finished**: {}", LocalDateTime(end))?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for TodoItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- {} **{}** {} (step {}, {} priority, ~{})",
            self.flow_icon,
            self.action,
            self.title,
            self.step_id,
            self.priority,
            Minutes(self.estimated_time.into())
        )
    }
}

impl fmt::Display for TemplateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} [{}] {}",
            self.step_order,
            self.step_name,
            self.step_type,
            Minutes(self.estimated_duration.into())
        )?;
        if !self.dependencies.is_empty() {
            let orders: Vec<String> = self.dependencies.iter().map(u32::to_string).collect();
            write!(f, ", after {}", orders.join(", "))?;
        }
        writeln!(f)
    }
}

impl fmt::Display for FlowTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- {} **{}** (`{}`)", self.icon, self.label, self.key)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- {} [{}] {}",
            LocalDateTime(&self.created_at),
            self.message_type,
            self.content
        )
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- **{}** (`{}`, {}) {} / {} / {}",
            self.display_name, self.name, self.service_type, self.region, self.core_level, self.idc
        )?;
        if let Some(group) = &self.group_name {
            write!(f, " / group {group}")?;
        }
        if let Some(url) = &self.management_url {
            write!(f, " [console]({url})")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.statistics;
        writeln!(
            f,
            "## {} (ID: {}) [{}]",
            self.task.name, self.task.id, self.task.status
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "- **Steps**: {}/{} completed, {} failed",
            stats.completed_steps, stats.total_steps, stats.failed_steps
        )?;
        writeln!(f, "- **Duration**: {}", Minutes(stats.total_duration))?;
        if let Some(end) = &self.task.end_time {
            writeln!(f, "- **Finished**: {}", LocalDateTime(end))?;
        }

        if !self.messages.is_empty() {
            writeln!(f)?;
            writeln!(f, "### Messages")?;
            writeln!(f)?;
            for message in &self.messages {
                write!(f, "{message}")?;
            }
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::StepLink;

    fn sample_step(order: u32, status: StepStatus, flow_type: &str) -> Step {
        Step {
            id: order as u64,
            task_id: 1,
            step_order: order,
            step_name: format!("Step {order}"),
            step_type: StepType::Switch,
            status,
            flow_type: flow_type.to_string(),
            estimated_duration: Some(90),
            actual_duration: None,
            start_time: None,
            end_time: None,
            notes: Some("Watch the 5xx rate".to_string()),
            dependencies: vec![1, 2],
            links: vec![StepLink::new("Traffic console", "https://traffic.example.com")],
            created_at: Timestamp::from_second(1640995200).unwrap(),
        }
    }

    #[test]
    fn test_step_display() {
        let output = sample_step(3, StepStatus::InProgress, "domestic_non_core").to_string();
        assert!(output.contains("### 3. Step 3 (➤ In Progress)"));
        assert!(output.contains("- Type: switch"));
        assert!(output.contains("- After: 1, 2"));
        assert!(output.contains("- Estimated: 1 h 30 min"));
        assert!(output.contains("Watch the 5xx rate"));
        assert!(output.contains("- [Traffic console](https://traffic.example.com)"));
    }

    #[test]
    fn test_task_display_groups_steps_by_flow() {
        let task = Task {
            id: 7,
            name: "Weekly release".to_string(),
            description: None,
            status: TaskStatus::InProgress,
            start_time: None,
            end_time: None,
            created_at: Timestamp::from_second(1640995200).unwrap(),
            updated_at: Timestamp::from_second(1640995200).unwrap(),
            steps: vec![
                sample_step(1, StepStatus::Completed, "domestic_non_core"),
                sample_step(100, StepStatus::Pending, "international_crawler"),
            ],
        };
        let output = task.to_string();
        assert!(output.starts_with("# 7. Weekly release"));
        assert!(output.contains("- Progress: 1/2 steps completed"));
        assert!(output.contains("## 🏠 Domestic non-core"));
        assert!(output.contains("## 🕷️ International crawler"));
        let domestic = output.find("## 🏠").unwrap();
        let crawler = output.find("## 🕷️").unwrap();
        assert!(domestic < crawler);
    }

    #[test]
    fn test_todo_display() {
        let todo = TodoItem {
            id: "confirm-4".into(),
            title: "Confirm: Shift traffic".into(),
            description: "Confirm that Shift traffic has finished".into(),
            flow_type: "domestic_non_core".into(),
            flow_label: "Domestic non-core".into(),
            flow_icon: "🏠".into(),
            priority: TodoPriority::Medium,
            estimated_time: 2,
            action: TodoAction::Confirm,
            step_id: 4,
            task_id: 1,
        };
        assert_eq!(
            todo.to_string(),
            "- 🏠 **confirm** Confirm: Shift traffic (step 4, medium priority, ~2 min)\n"
        );
    }

    #[test]
    fn test_template_step_display() {
        let step = TemplateStep {
            id: 1,
            flow_type: "international_crawler".into(),
            step_order: 2,
            step_name: "Check crawler data consistency".into(),
            step_type: StepType::Verify,
            estimated_duration: 8,
            dependencies: vec![1],
            links: vec![],
        };
        assert_eq!(
            step.to_string(),
            "2. Check crawler data consistency [verify] 8 min, after 1\n"
        );
    }
}
