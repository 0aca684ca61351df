//! Flow template definitions.

use serde::{Deserialize, Serialize};

use super::{StepLink, StepType};

/// One stored step definition of a flow type's template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateStep {
    pub id: u64,
    pub flow_type: String,
    /// 1-based position inside the template
    pub step_order: u32,
    pub step_name: String,
    pub step_type: StepType,
    pub estimated_duration: u32,
    /// Template-relative (1-based) indices of prerequisite steps
    #[serde(default)]
    pub dependencies: Vec<u32>,
    #[serde(default)]
    pub links: Vec<StepLink>,
}

/// A step definition as supplied by an administrator, before numbering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TemplateStepInput {
    #[serde(alias = "stepName")]
    pub step_name: String,
    #[serde(alias = "stepType")]
    pub step_type: StepType,
    #[serde(default, alias = "estimatedDuration")]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub dependencies: Vec<u32>,
    #[serde(default)]
    pub links: Vec<StepLink>,
}

impl From<&TemplateStep> for TemplateStepInput {
    fn from(step: &TemplateStep) -> Self {
        Self {
            step_name: step.step_name.clone(),
            step_type: step.step_type,
            estimated_duration: Some(step.estimated_duration),
            dependencies: step.dependencies.clone(),
            links: step.links.clone(),
        }
    }
}

/// Display metadata for a built-in flow type.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FlowTypeInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}
