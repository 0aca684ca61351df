//! Flow template store operations for the Runbook.

use log::info;

use super::Runbook;
use crate::{
    display::{FlowTypes, Templates},
    error::Result,
    flows,
    params::{ListTemplates, ReplaceTemplates, ResetTemplates},
};

impl Runbook {
    /// Stored template steps, ordered by flow type then step_order.
    pub async fn list_templates(&self, params: &ListTemplates) -> Result<Templates> {
        let flow_type = params
            .flow_type
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| flows::canonical_flow_type(f).to_string());

        self.with_database(move |db| db.list_templates(flow_type.as_deref()))
            .await
            .map(Templates)
    }

    /// Replaces a flow type's template in one transaction. Steps already
    /// materialized into tasks are unaffected.
    pub async fn replace_templates(&self, params: &ReplaceTemplates) -> Result<Templates> {
        let flow_type = flows::canonical_flow_type(params.flow_type.trim()).to_string();
        let templates = params.templates.clone();

        let stored = self
            .with_database({
                let flow_type = flow_type.clone();
                move |db| db.replace_templates(&flow_type, &templates)
            })
            .await?;

        info!(
            "Replaced template of flow type '{flow_type}' with {} steps",
            stored.len()
        );
        Ok(Templates(stored))
    }

    /// Restores one built-in flow type (or all of them) to its baseline.
    /// Returns the flow types that were reset.
    pub async fn reset_templates(&self, params: &ResetTemplates) -> Result<Vec<String>> {
        let flow_type = params
            .flow_type
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| flows::canonical_flow_type(f).to_string());

        let reset = self
            .with_database(move |db| db.reset_templates(flow_type.as_deref()))
            .await?;

        info!("Reset templates to baseline: {}", reset.join(", "));
        Ok(reset)
    }

    /// The built-in flow type catalogue.
    pub fn list_flow_types(&self) -> FlowTypes {
        FlowTypes(flows::FLOW_TYPES.to_vec())
    }
}
