//! Flow template storage and resolution.

use log::info;
use rusqlite::{params, Connection, Row, TransactionBehavior};

use super::utils::{id_at, parsed_at};
use crate::{
    error::{DatabaseResultExt, Result, RunbookError},
    flows,
    models::{
        step::{parse_dependencies, parse_links},
        TemplateStep, TemplateStepInput,
    },
};

const TEMPLATE_COLUMNS: &str =
    "id, flow_type, step_order, step_name, step_type, estimated_duration, dependencies, links";
const COUNT_TEMPLATES_SQL: &str = "SELECT COUNT(*) FROM flow_templates WHERE flow_type = ?1";
const DELETE_TEMPLATES_SQL: &str = "DELETE FROM flow_templates WHERE flow_type = ?1";
const INSERT_TEMPLATE_SQL: &str = "INSERT INTO flow_templates (flow_type, step_order, step_name, step_type, estimated_duration, dependencies, links) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

fn build_template_from_row(row: &Row) -> rusqlite::Result<TemplateStep> {
    let dependencies: Option<String> = row.get(6)?;
    let links: Option<String> = row.get(7)?;

    Ok(TemplateStep {
        id: id_at(row, 0)?,
        flow_type: row.get(1)?,
        step_order: row.get::<_, i64>(2)? as u32,
        step_name: row.get(3)?,
        step_type: parsed_at(row, 4)?,
        estimated_duration: row.get::<_, Option<i64>>(5)?.unwrap_or(0).max(0) as u32,
        dependencies: parse_dependencies(dependencies.as_deref()),
        links: parse_links(links.as_deref()),
    })
}

fn query_templates(connection: &Connection, flow_type: Option<&str>) -> Result<Vec<TemplateStep>> {
    let (sql, filter) = match flow_type {
        Some(flow_type) => (
            format!(
                "SELECT {TEMPLATE_COLUMNS} FROM flow_templates WHERE flow_type = ?1 ORDER BY step_order"
            ),
            Some(flows::canonical_flow_type(flow_type)),
        ),
        None => (
            format!("SELECT {TEMPLATE_COLUMNS} FROM flow_templates ORDER BY flow_type, step_order"),
            None,
        ),
    };

    let mut stmt = connection
        .prepare(&sql)
        .db_context("Failed to prepare template query")?;
    let rows = match filter {
        Some(flow_type) => stmt.query_map(params![flow_type], build_template_from_row),
        None => stmt.query_map([], build_template_from_row),
    }
    .db_context("Failed to query templates")?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .db_context("Failed to read template rows")
}

/// Replaces every stored row of `flow_type`, numbering steps 1..N.
fn write_templates(
    connection: &Connection,
    flow_type: &str,
    steps: &[TemplateStepInput],
) -> Result<()> {
    connection
        .execute(DELETE_TEMPLATES_SQL, params![flow_type])
        .db_context("Failed to delete templates")?;

    for (index, step) in steps.iter().enumerate() {
        let dependencies = serde_json::to_string(&step.dependencies)?;
        let links = serde_json::to_string(&step.links)?;
        connection
            .execute(
                INSERT_TEMPLATE_SQL,
                params![
                    flow_type,
                    index as i64 + 1,
                    step.step_name.trim(),
                    step.step_type.as_str(),
                    step.estimated_duration.unwrap_or(0) as i64,
                    dependencies,
                    links
                ],
            )
            .db_context("Failed to insert template step")?;
    }
    Ok(())
}

/// Template a new task will materialize for `flow_type`: the stored rows,
/// else the built-in baseline.
pub(super) fn resolve_template(
    connection: &Connection,
    flow_type: &str,
) -> Result<Vec<TemplateStepInput>> {
    let stored = query_templates(connection, Some(flow_type))?;
    if !stored.is_empty() {
        return Ok(stored.iter().map(TemplateStepInput::from).collect());
    }

    flows::baseline_template(flow_type).ok_or_else(|| RunbookError::UnknownFlowType {
        flow_type: flow_type.to_string(),
    })
}

impl super::Database {
    /// Lists stored template steps, ordered by flow type then step_order.
    pub fn list_templates(&self, flow_type: Option<&str>) -> Result<Vec<TemplateStep>> {
        query_templates(&self.connection, flow_type)
    }

    /// Atomically replaces a flow type's template.
    pub fn replace_templates(
        &mut self,
        flow_type: &str,
        steps: &[TemplateStepInput],
    ) -> Result<Vec<TemplateStep>> {
        let flow_type = flows::canonical_flow_type(flow_type);
        flows::validate_template(flow_type, steps)?;

        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;
        write_templates(&tx, flow_type, steps)?;
        tx.commit().db_context("Failed to commit transaction")?;

        self.list_templates(Some(flow_type))
    }

    /// Restores the baseline of one built-in flow type, or of all of them.
    ///
    /// Returns the flow types that were reset.
    pub fn reset_templates(&mut self, flow_type: Option<&str>) -> Result<Vec<String>> {
        let targets: Vec<&'static str> = match flow_type {
            Some(flow_type) => {
                let info = flows::flow_type_info(flow_type).ok_or_else(|| {
                    RunbookError::UnknownFlowType {
                        flow_type: flow_type.to_string(),
                    }
                })?;
                vec![info.key]
            }
            None => flows::FLOW_TYPES.iter().map(|info| info.key).collect(),
        };

        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;
        for key in &targets {
            if let Some(baseline) = flows::baseline_template(key) {
                write_templates(&tx, key, &baseline)?;
            }
        }
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(targets.into_iter().map(String::from).collect())
    }

    /// Seeds the baseline of every built-in flow type without stored rows.
    pub(super) fn seed_missing_templates(&mut self) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        for info in &flows::FLOW_TYPES {
            let count: i64 = tx
                .query_row(COUNT_TEMPLATES_SQL, params![info.key], |row| row.get(0))
                .db_context("Failed to count templates")?;
            if count > 0 {
                continue;
            }
            if let Some(baseline) = flows::baseline_template(info.key) {
                write_templates(&tx, info.key, &baseline)?;
                info!("Seeded {} baseline template steps for {}", baseline.len(), info.key);
            }
        }

        tx.commit().db_context("Failed to commit transaction")
    }
}
