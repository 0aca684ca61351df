//! Command-line argument wrappers and the command dispatcher
//!
//! Every subcommand has a clap argument struct converted into the matching
//! core parameter type, so core params stay free of clap attributes:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Runbook
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use jiff::Timestamp;
use log::debug;
use runbook_core::{
    display::OperationStatus,
    models::ServiceType,
    params::{
        CreateService, CreateTask, ForceComplete, HistoryQuery, Id, ListTasks, ListTemplates,
        ReplaceTemplates, ResetTemplates, UpdateStep, UpdateTask,
    },
    Runbook,
};

use crate::renderer::TerminalRenderer;

// ============================================================================
// Task commands
// ============================================================================

/// Create a task and materialize its steps
#[derive(Args)]
pub struct CreateTaskArgs {
    /// Name of the rollout
    pub name: String,
    #[arg(short, long, help = "Optional description of the rollout")]
    pub description: Option<String>,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Flow types to ship, comma-separated and in order; all built-in flow types when omitted"
    )]
    pub flow_types: Vec<String>,
}

impl From<CreateTaskArgs> for CreateTask {
    fn from(val: CreateTaskArgs) -> Self {
        CreateTask {
            name: val.name,
            description: val.description,
            flow_types: val.flow_types,
        }
    }
}

#[derive(Args)]
pub struct ListTasksArgs {
    #[arg(short, long, help = "Only list tasks with this status")]
    pub status: Option<TaskStatusArg>,
}

impl From<ListTasksArgs> for ListTasks {
    fn from(val: ListTasksArgs) -> Self {
        ListTasks {
            status: val.status.map(|s| s.as_str().to_string()),
        }
    }
}

/// Any command addressing a single task or step by ID
#[derive(Args)]
pub struct IdArgs {
    #[arg(help = "Unique identifier")]
    pub id: u64,
}

impl From<IdArgs> for Id {
    fn from(val: IdArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Args)]
pub struct UpdateTaskArgs {
    #[arg(help = "Unique identifier of the task to update")]
    pub id: u64,
    #[arg(short, long, help = "New name")]
    pub name: Option<String>,
    #[arg(short, long, help = "New description; an empty string clears it")]
    pub description: Option<String>,
    #[arg(short, long, help = "New status")]
    pub status: Option<TaskStatusArg>,
    #[arg(long, help = "Start time (RFC 3339)")]
    pub start_time: Option<Timestamp>,
    #[arg(long, help = "End time (RFC 3339)")]
    pub end_time: Option<Timestamp>,
}

impl From<UpdateTaskArgs> for UpdateTask {
    fn from(val: UpdateTaskArgs) -> Self {
        UpdateTask {
            id: val.id,
            name: val.name,
            description: val.description,
            status: val.status.map(|s| s.as_str().to_string()),
            start_time: val.start_time.map(|t| t.to_string()),
            end_time: val.end_time.map(|t| t.to_string()),
        }
    }
}

#[derive(Args)]
pub struct ForceCompleteArgs {
    #[arg(help = "Unique identifier of the in-progress task")]
    pub id: u64,
    #[arg(short, long, help = "Why the remaining steps are bypassed")]
    pub reason: Option<String>,
}

impl From<ForceCompleteArgs> for ForceComplete {
    fn from(val: ForceCompleteArgs) -> Self {
        ForceComplete {
            id: val.id,
            reason: val.reason,
        }
    }
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Start a rollout
    #[command(alias = "c")]
    Create(CreateTaskArgs),
    /// List tasks, newest first
    #[command(aliases = ["l", "ls"])]
    List(ListTasksArgs),
    /// Show a task with its steps
    #[command(alias = "s")]
    Show(IdArgs),
    /// Show the task in progress
    Current,
    /// Update task fields
    #[command(alias = "u")]
    Update(UpdateTaskArgs),
    /// Pause a task so another one can start
    Pause(IdArgs),
    /// Resume a paused task
    Resume(IdArgs),
    /// Mark a task as failed
    Fail(IdArgs),
    /// Complete a task regardless of unfinished steps
    ForceComplete(ForceCompleteArgs),
    /// Delete a task and its steps
    #[command(aliases = ["d", "rm"])]
    Delete(IdArgs),
    /// Show what can be done next
    #[command(alias = "t")]
    Todos(IdArgs),
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum TaskStatusArg {
    Draft,
    InProgress,
    Completed,
    Failed,
    Paused,
}

impl TaskStatusArg {
    fn as_str(self) -> &'static str {
        match self {
            TaskStatusArg::Draft => "draft",
            TaskStatusArg::InProgress => "in_progress",
            TaskStatusArg::Completed => "completed",
            TaskStatusArg::Failed => "failed",
            TaskStatusArg::Paused => "paused",
        }
    }
}

// ============================================================================
// Step commands
// ============================================================================

/// Move a step to a fixed status, optionally leaving a note
#[derive(Args)]
pub struct StepTransitionArgs {
    #[arg(help = "Unique identifier of the step")]
    pub id: u64,
    #[arg(short, long, help = "Operator notes to store with the step")]
    pub notes: Option<String>,
}

impl StepTransitionArgs {
    fn into_params(self, status: &str) -> UpdateStep {
        UpdateStep {
            id: self.id,
            status: Some(status.to_string()),
            notes: self.notes,
            ..Default::default()
        }
    }
}

#[derive(Args)]
pub struct UpdateStepArgs {
    #[arg(help = "Unique identifier of the step to update")]
    pub id: u64,
    #[arg(short, long, help = "New status")]
    pub status: Option<StepStatusArg>,
    #[arg(short, long, help = "Operator notes; an empty string clears them")]
    pub notes: Option<String>,
    #[arg(long, help = "Start time (RFC 3339)")]
    pub start_time: Option<Timestamp>,
    #[arg(long, help = "End time (RFC 3339)")]
    pub end_time: Option<Timestamp>,
}

impl From<UpdateStepArgs> for UpdateStep {
    fn from(val: UpdateStepArgs) -> Self {
        UpdateStep {
            id: val.id,
            status: val.status.map(|s| s.as_str().to_string()),
            notes: val.notes,
            start_time: val.start_time.map(|t| t.to_string()),
            end_time: val.end_time.map(|t| t.to_string()),
        }
    }
}

#[derive(Args)]
pub struct NoteStepArgs {
    #[arg(help = "Unique identifier of the step")]
    pub id: u64,
    #[arg(help = "Note text; an empty string clears the notes")]
    pub notes: String,
}

impl From<NoteStepArgs> for UpdateStep {
    fn from(val: NoteStepArgs) -> Self {
        UpdateStep {
            id: val.id,
            notes: Some(val.notes),
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub enum StepCommands {
    /// List the steps of a task
    #[command(aliases = ["l", "ls"])]
    List(IdArgs),
    /// Show a step
    #[command(alias = "s")]
    Show(IdArgs),
    /// Start a pending step
    Start(StepTransitionArgs),
    /// Complete a step
    #[command(alias = "done")]
    Complete(StepTransitionArgs),
    /// Mark an in-progress step as failed
    Fail(StepTransitionArgs),
    /// Skip a pending step
    Skip(StepTransitionArgs),
    /// Replace a step's notes
    Note(NoteStepArgs),
    /// Update step fields
    #[command(alias = "u")]
    Update(UpdateStepArgs),
    /// Record the sync notification for a step and print it
    Notify(IdArgs),
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum StepStatusArg {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl StepStatusArg {
    fn as_str(self) -> &'static str {
        match self {
            StepStatusArg::Pending => "pending",
            StepStatusArg::InProgress => "in_progress",
            StepStatusArg::Completed => "completed",
            StepStatusArg::Failed => "failed",
            StepStatusArg::Skipped => "skipped",
        }
    }
}

// ============================================================================
// Template, history and service commands
// ============================================================================

#[derive(Args)]
pub struct ListTemplatesArgs {
    #[arg(short, long, help = "Only list this flow type")]
    pub flow_type: Option<String>,
}

impl From<ListTemplatesArgs> for ListTemplates {
    fn from(val: ListTemplatesArgs) -> Self {
        ListTemplates {
            flow_type: val.flow_type,
        }
    }
}

#[derive(Args)]
pub struct ReplaceTemplatesArgs {
    #[arg(help = "Flow type whose template is replaced")]
    pub flow_type: String,
    #[arg(help = "JSON file holding the new steps, either an array or {\"templates\": [...]}")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ResetTemplatesArgs {
    #[arg(help = "Built-in flow type to reset; all of them when omitted")]
    pub flow_type: Option<String>,
}

impl From<ResetTemplatesArgs> for ResetTemplates {
    fn from(val: ResetTemplatesArgs) -> Self {
        ResetTemplates {
            flow_type: val.flow_type,
        }
    }
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List stored templates
    #[command(aliases = ["l", "ls"])]
    List(ListTemplatesArgs),
    /// Replace a flow type's template from a JSON file
    Replace(ReplaceTemplatesArgs),
    /// Restore baseline templates
    Reset(ResetTemplatesArgs),
}

#[derive(Args)]
pub struct ListHistoryArgs {
    #[arg(short, long, help = "1-based page number")]
    pub page: Option<u32>,
    #[arg(long, help = "Records per page")]
    pub page_size: Option<u32>,
}

impl From<ListHistoryArgs> for HistoryQuery {
    fn from(val: ListHistoryArgs) -> Self {
        HistoryQuery {
            page: val.page,
            page_size: val.page_size,
        }
    }
}

#[derive(Args)]
pub struct ExportHistoryArgs {
    #[arg(help = "Unique identifier of the task")]
    pub id: u64,
    #[arg(short, long, help = "Write the JSON to this file instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List finished tasks
    #[command(aliases = ["l", "ls"])]
    List(ListHistoryArgs),
    /// Show a finished task with statistics and messages
    #[command(alias = "s")]
    Show(IdArgs),
    /// Export a task with its steps and messages as JSON
    Export(ExportHistoryArgs),
}

#[derive(Args)]
pub struct AddServiceArgs {
    /// Technical name
    pub name: String,
    /// Name shown to operators
    pub display_name: String,
    #[arg(short = 't', long = "type", help = "Kind of service")]
    pub service_type: ServiceTypeArg,
    #[arg(short, long, help = "Region, e.g. domestic or international")]
    pub region: String,
    #[arg(short, long, help = "Core level, e.g. core or non_core")]
    pub core_level: String,
    #[arg(short, long, help = "Data center, e.g. IDC1")]
    pub idc: String,
    #[arg(long, help = "Deployment group")]
    pub group: Option<String>,
    #[arg(long, help = "Service path")]
    pub path: Option<String>,
    #[arg(long, help = "Management console URL")]
    pub url: Option<String>,
}

impl From<AddServiceArgs> for CreateService {
    fn from(val: AddServiceArgs) -> Self {
        CreateService {
            name: val.name,
            display_name: val.display_name,
            service_type: val.service_type.into(),
            region: val.region,
            core_level: val.core_level,
            idc: val.idc,
            group_name: val.group,
            service_path: val.path,
            management_url: val.url,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ServiceTypeArg {
    Ds,
    Service,
    Api,
}

impl From<ServiceTypeArg> for ServiceType {
    fn from(val: ServiceTypeArg) -> Self {
        match val {
            ServiceTypeArg::Ds => ServiceType::Ds,
            ServiceTypeArg::Service => ServiceType::Service,
            ServiceTypeArg::Api => ServiceType::Api,
        }
    }
}

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// List registered services
    #[command(aliases = ["l", "ls"])]
    List,
    /// Register a service
    #[command(alias = "a")]
    Add(AddServiceArgs),
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Runs parsed commands against a runbook and renders the markdown output.
pub struct Cli {
    runbook: Runbook,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(runbook: Runbook, renderer: TerminalRenderer) -> Self {
        Self { runbook, renderer }
    }

    fn print(&self, output: impl ToString) -> Result<()> {
        self.renderer.render(&output.to_string())
    }

    fn status_update(id: u64, status: TaskStatusArg) -> UpdateTask {
        UpdateTask {
            id,
            status: Some(status.as_str().to_string()),
            ..Default::default()
        }
    }

    pub async fn handle_task_command(&self, command: TaskCommands) -> Result<()> {
        match command {
            TaskCommands::Create(args) => {
                let result = self.runbook.create_task_result(&args.into()).await?;
                self.print(result)
            }
            TaskCommands::List(args) => self.list_tasks(&args.into()).await,
            TaskCommands::Show(args) => {
                let task = self.runbook.show_task(&args.into()).await?;
                self.print(task)
            }
            TaskCommands::Current => self.current_task().await,
            TaskCommands::Update(args) => {
                let result = self.runbook.update_task_result(&args.into()).await?;
                self.print(result)
            }
            TaskCommands::Pause(IdArgs { id }) => {
                let params = Self::status_update(id, TaskStatusArg::Paused);
                self.print(self.runbook.update_task_result(&params).await?)
            }
            TaskCommands::Resume(IdArgs { id }) => {
                let params = Self::status_update(id, TaskStatusArg::InProgress);
                self.print(self.runbook.update_task_result(&params).await?)
            }
            TaskCommands::Fail(IdArgs { id }) => {
                let params = Self::status_update(id, TaskStatusArg::Failed);
                self.print(self.runbook.update_task_result(&params).await?)
            }
            TaskCommands::ForceComplete(args) => {
                let result = self.runbook.force_complete_task_result(&args.into()).await?;
                self.print(result)
            }
            TaskCommands::Delete(args) => {
                let result = self.runbook.delete_task_result(&args.into()).await?;
                self.print(result)
            }
            TaskCommands::Todos(args) => {
                let params: Id = args.into();
                let todos = self.runbook.list_todos(&params).await?;
                self.print(format!("# Todo for task {}\n\n{todos}", params.id))
            }
        }
    }

    pub async fn handle_step_command(&self, command: StepCommands) -> Result<()> {
        let params = match command {
            StepCommands::List(args) => {
                let steps = self.runbook.list_steps(&args.into()).await?;
                return self.print(steps);
            }
            StepCommands::Show(args) => {
                let step = self.runbook.show_step(&args.into()).await?;
                return self.print(step);
            }
            StepCommands::Notify(IdArgs { id }) => {
                let message = self.runbook.copy_notification(id).await?;
                return self.print(format!("{}\n", message.content));
            }
            StepCommands::Start(args) => args.into_params("in_progress"),
            StepCommands::Complete(args) => args.into_params("completed"),
            StepCommands::Fail(args) => args.into_params("failed"),
            StepCommands::Skip(args) => args.into_params("skipped"),
            StepCommands::Note(args) => args.into(),
            StepCommands::Update(args) => args.into(),
        };
        debug!("Updating step {}", params.id);
        let result = self.runbook.update_step_result(&params).await?;
        self.print(result)
    }

    pub async fn handle_template_command(&self, command: TemplateCommands) -> Result<()> {
        match command {
            TemplateCommands::List(args) => {
                let templates = self.runbook.list_templates(&args.into()).await?;
                self.print(templates)
            }
            TemplateCommands::Replace(args) => {
                let json = std::fs::read_to_string(&args.file)
                    .with_context(|| format!("Failed to read {}", args.file.display()))?;
                let params = ReplaceTemplates::from_json(&args.flow_type, &json)?;
                let templates = self.runbook.replace_templates(&params).await?;
                self.print(format!(
                    "{}\n{templates}",
                    OperationStatus::success(format!(
                        "Replaced template '{}' with {} steps",
                        params.flow_type,
                        templates.len()
                    ))
                ))
            }
            TemplateCommands::Reset(args) => {
                let reset = self.runbook.reset_templates(&args.into()).await?;
                self.print(OperationStatus::success(format!(
                    "Templates reset to baseline: {}",
                    reset.join(", ")
                )))
            }
        }
    }

    pub fn list_flow_types(&self) -> Result<()> {
        self.print(format!("# Flow Types\n\n{}", self.runbook.list_flow_types()))
    }

    pub async fn handle_history_command(&self, command: HistoryCommands) -> Result<()> {
        match command {
            HistoryCommands::List(args) => {
                let page = self.runbook.list_history(&args.into()).await?;
                self.print(format!("# History\n\n{page}"))
            }
            HistoryCommands::Show(args) => {
                let record = self.runbook.get_history(&args.into()).await?;
                self.print(record)
            }
            HistoryCommands::Export(ExportHistoryArgs { id, output }) => {
                let json = self.runbook.export_history(&Id { id }).await?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, json)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        self.print(OperationStatus::success(format!(
                            "Exported task {id} to {}",
                            path.display()
                        )))
                    }
                    None => {
                        println!("{json}");
                        Ok(())
                    }
                }
            }
        }
    }

    pub async fn handle_service_command(&self, command: ServiceCommands) -> Result<()> {
        match command {
            ServiceCommands::List => {
                let services = self.runbook.list_services().await?;
                self.print(format!("# Services\n\n{services}"))
            }
            ServiceCommands::Add(args) => {
                let service = self.runbook.create_service(&args.into()).await?;
                self.print(OperationStatus::success(format!(
                    "Registered service '{}' (ID: {})",
                    service.name, service.id
                )))
            }
        }
    }

    pub async fn list_tasks(&self, params: &ListTasks) -> Result<()> {
        let summaries = self.runbook.list_tasks_summary(params).await?;
        let title = match params.status.as_deref() {
            Some(status) => format!("Tasks ({status})"),
            None => "Tasks".to_string(),
        };
        self.print(format!("# {title}\n\n{summaries}"))
    }

    /// Shows the task in progress, or a notice when there is none.
    pub async fn current_task(&self) -> Result<()> {
        match self.runbook.current_task().await? {
            Some(task) => self.print(task),
            None => self.print("No task in progress.\n"),
        }
    }
}
