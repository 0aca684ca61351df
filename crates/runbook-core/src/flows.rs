//! Built-in flow types, their baseline templates, and step materialization.
//!
//! Every flow type selected for a task owns a reserved band of `step_order`
//! values. The flow type at selection position `k` (0-based) starts at
//! [`band_start`]`(k)` and may use at most [`MAX_TEMPLATE_STEPS`] orders, so
//! bands never overlap however long a template grows:
//!
//! | position | band          |
//! |----------|---------------|
//! | 0        | `[1, 100)`    |
//! | 1        | `[100, 200)`  |
//! | 2        | `[200, 300)`  |
//!
//! Template dependencies are 1-based indices into the template and are
//! shifted by `band_start - 1` when a step is materialized.

use crate::{
    error::{Result, RunbookError},
    models::{FlowTypeInfo, StepLink, StepType, TemplateStepInput},
};

/// Width of one step_order band.
pub const BAND_WIDTH: u32 = 100;

/// Most steps a single template may hold while still fitting its band.
pub const MAX_TEMPLATE_STEPS: usize = 99;

pub const DOMESTIC_NON_CORE: &str = "domestic_non_core";
pub const INTERNATIONAL_NON_CORE: &str = "international_non_core";
pub const INTERNATIONAL_CRAWLER: &str = "international_crawler";

/// Icon used for flow types that are not part of the catalogue.
pub const FALLBACK_FLOW_ICON: &str = "📋";

/// The built-in flow type catalogue, in default selection order.
pub const FLOW_TYPES: [FlowTypeInfo; 3] = [
    FlowTypeInfo {
        key: DOMESTIC_NON_CORE,
        label: "Domestic non-core",
        icon: "🏠",
    },
    FlowTypeInfo {
        key: INTERNATIONAL_NON_CORE,
        label: "International non-core",
        icon: "🌍",
    },
    FlowTypeInfo {
        key: INTERNATIONAL_CRAWLER,
        label: "International crawler",
        icon: "🕷️",
    },
];

// Keys accepted from older clients, mapped to their current name.
const LEGACY_ALIASES: [(&str, &str); 1] = [("non_core_deployment", DOMESTIC_NON_CORE)];

/// Looks up catalogue metadata for a flow type key (aliases included).
pub fn flow_type_info(key: &str) -> Option<&'static FlowTypeInfo> {
    let key = canonical_flow_type(key);
    FLOW_TYPES.iter().find(|info| info.key == key)
}

/// Label and icon shown next to a flow type, falling back to the raw key.
pub fn flow_label(key: &str) -> (String, String) {
    match flow_type_info(key) {
        Some(info) => (info.label.to_string(), info.icon.to_string()),
        None => (key.to_string(), FALLBACK_FLOW_ICON.to_string()),
    }
}

/// Resolves legacy aliases and surrounding whitespace.
pub fn canonical_flow_type(key: &str) -> &str {
    let key = key.trim();
    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

/// Whether the key names a built-in flow type.
pub fn is_builtin(key: &str) -> bool {
    flow_type_info(key).is_some()
}

/// Canonicalizes a flow type selection.
///
/// Blank entries are dropped, duplicates collapse onto their first
/// occurrence, and an empty selection becomes every built-in flow type.
pub fn normalize_selection<S: AsRef<str>>(flow_types: &[S]) -> Vec<String> {
    let mut selection: Vec<String> = Vec::new();
    for flow_type in flow_types {
        let key = canonical_flow_type(flow_type.as_ref());
        if key.is_empty() || selection.iter().any(|existing| existing == key) {
            continue;
        }
        selection.push(key.to_string());
    }

    if selection.is_empty() {
        selection = FLOW_TYPES.iter().map(|info| info.key.to_string()).collect();
    }
    selection
}

/// First step_order of the band at `position` in the selection.
pub fn band_start(position: usize) -> u32 {
    if position == 0 {
        1
    } else {
        position as u32 * BAND_WIDTH
    }
}

/// Reference links offered for a step when its template supplies none.
pub fn default_links(step_type: StepType) -> Vec<StepLink> {
    match step_type {
        StepType::Verify => vec![
            StepLink::new("Monitoring", "https://monitor.example.com/dashboard"),
            StepLink::new("Logs", "https://logs.example.com/search"),
        ],
        StepType::Deploy | StepType::Rollback => vec![
            StepLink::new("Deploy console", "https://deploy.example.com/console"),
            StepLink::new("Service status", "https://status.example.com/health"),
        ],
        StepType::Switch => vec![
            StepLink::new("Traffic console", "https://traffic.example.com/control"),
            StepLink::new("Load balancer", "https://lb.example.com/balance"),
        ],
        StepType::Config => vec![
            StepLink::new("Config center", "https://config.example.com/settings"),
            StepLink::new("Admin console", "https://admin.example.com/config"),
        ],
    }
}

struct BaselineStep {
    name: &'static str,
    step_type: StepType,
    minutes: u32,
    after: &'static [u32],
}

const fn step(
    name: &'static str,
    step_type: StepType,
    minutes: u32,
    after: &'static [u32],
) -> BaselineStep {
    BaselineStep {
        name,
        step_type,
        minutes,
        after,
    }
}

const DOMESTIC_BASELINE: [BaselineStep; 16] = [
    step("Disable auto-loading switch", StepType::Config, 5, &[]),
    step("Shift traffic to IDC2", StepType::Switch, 10, &[1]),
    step("Deploy domestic non-core IDC1 DS group B", StepType::Deploy, 30, &[2]),
    step("Deploy domestic non-core IDC1 Service", StepType::Deploy, 20, &[3]),
    step("Switch domestic non-core IDC1 DS to group B and warm up GS", StepType::Switch, 10, &[4]),
    step("Verify service warm-up", StepType::Verify, 15, &[5]),
    step("Shift 2% of traffic to IDC1", StepType::Switch, 5, &[6]),
    step("Shift 5% of traffic to IDC1", StepType::Switch, 5, &[7]),
    step("Shift 10% of traffic to IDC1", StepType::Switch, 5, &[8]),
    step("Shift 20% of traffic to IDC1", StepType::Switch, 5, &[9]),
    step("Shift 50% of traffic to IDC1", StepType::Switch, 5, &[10]),
    step("Shift 80% of traffic to IDC1", StepType::Switch, 5, &[11]),
    step("Shift 100% of traffic to IDC1", StepType::Switch, 5, &[12]),
    step("Deploy domestic non-core IDC1 DS group A", StepType::Deploy, 25, &[13]),
    step("Switch domestic non-core IDC1 to group A", StepType::Switch, 5, &[14]),
    step("Enable auto-loading switch", StepType::Config, 3, &[15]),
];

const INTERNATIONAL_BASELINE: [BaselineStep; 9] = [
    step("Disable international auto-loading switch", StepType::Config, 5, &[]),
    step("Check international version data", StepType::Verify, 10, &[1]),
    step("Shift international traffic to IDC2", StepType::Switch, 5, &[2]),
    step("Deploy international non-core IDC1 DS group A", StepType::Deploy, 30, &[3]),
    step("Switch international DS to group A", StepType::Switch, 5, &[4]),
    step("Deploy international non-core IDC1 DS group B", StepType::Deploy, 25, &[5]),
    step("Deploy international non-core IDC1 Service", StepType::Deploy, 20, &[6]),
    step("Verify international service warm-up", StepType::Verify, 15, &[7]),
    step("Gradually shift international traffic to IDC1", StepType::Switch, 60, &[8]),
];

const CRAWLER_BASELINE: [BaselineStep; 7] = [
    step("Pause crawler scheduling", StepType::Config, 3, &[]),
    step("Check crawler data consistency", StepType::Verify, 8, &[1]),
    step("Stop crawler service", StepType::Switch, 3, &[2]),
    step("Deploy international crawler IDC1", StepType::Deploy, 20, &[3]),
    step("Start crawler service", StepType::Switch, 3, &[4]),
    step("Verify crawler functionality", StepType::Verify, 10, &[5]),
    step("Resume crawler scheduling", StepType::Switch, 3, &[6]),
];

/// Hardcoded baseline template of a built-in flow type.
pub fn baseline_template(flow_type: &str) -> Option<Vec<TemplateStepInput>> {
    let baseline: &[BaselineStep] = match canonical_flow_type(flow_type) {
        DOMESTIC_NON_CORE => &DOMESTIC_BASELINE,
        INTERNATIONAL_NON_CORE => &INTERNATIONAL_BASELINE,
        INTERNATIONAL_CRAWLER => &CRAWLER_BASELINE,
        _ => return None,
    };

    Some(
        baseline
            .iter()
            .map(|step| TemplateStepInput {
                step_name: step.name.to_string(),
                step_type: step.step_type,
                estimated_duration: Some(step.minutes),
                dependencies: step.after.to_vec(),
                links: Vec::new(),
            })
            .collect(),
    )
}

/// Checks a template before it is stored.
///
/// Dependencies may only point at earlier steps, which keeps every stored
/// template acyclic.
pub fn validate_template(flow_type: &str, steps: &[TemplateStepInput]) -> Result<()> {
    if canonical_flow_type(flow_type).is_empty() {
        return Err(RunbookError::invalid_input("flow_type").with_reason("Flow type cannot be empty"));
    }
    if steps.is_empty() {
        return Err(RunbookError::invalid_input("templates")
            .with_reason("A template needs at least one step"));
    }
    if steps.len() > MAX_TEMPLATE_STEPS {
        return Err(RunbookError::invalid_input("templates").with_reason(format!(
            "A template holds at most {MAX_TEMPLATE_STEPS} steps, got {}",
            steps.len()
        )));
    }

    for (index, step) in steps.iter().enumerate() {
        let position = index as u32 + 1;
        if step.step_name.trim().is_empty() {
            return Err(RunbookError::invalid_input("step_name")
                .with_reason(format!("Step {position} has an empty name")));
        }
        if let Some(dependency) = step
            .dependencies
            .iter()
            .find(|dependency| **dependency == 0 || **dependency >= position)
        {
            return Err(RunbookError::invalid_input("dependencies").with_reason(format!(
                "Step {position} depends on {dependency}; dependencies must reference earlier steps"
            )));
        }
    }
    Ok(())
}

/// A step ready to be inserted for a task.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStep {
    pub step_order: u32,
    pub step_name: String,
    pub step_type: StepType,
    pub flow_type: String,
    pub estimated_duration: Option<u32>,
    pub dependencies: Vec<u32>,
    pub links: Vec<StepLink>,
}

/// Lays out one flow type's template inside the band at `position`.
pub fn plan_flow_steps(
    position: usize,
    flow_type: &str,
    template: &[TemplateStepInput],
) -> Result<Vec<PlannedStep>> {
    if template.len() > MAX_TEMPLATE_STEPS {
        return Err(RunbookError::invalid_input("templates").with_reason(format!(
            "Template for '{flow_type}' has {} steps and does not fit a band of {BAND_WIDTH}",
            template.len()
        )));
    }

    let offset = band_start(position) - 1;
    Ok(template
        .iter()
        .enumerate()
        .map(|(index, step)| PlannedStep {
            step_order: offset + index as u32 + 1,
            step_name: step.step_name.clone(),
            step_type: step.step_type,
            flow_type: flow_type.to_string(),
            estimated_duration: step.estimated_duration,
            dependencies: step
                .dependencies
                .iter()
                .map(|dependency| dependency + offset)
                .collect(),
            links: if step.links.is_empty() {
                default_links(step.step_type)
            } else {
                step.links.clone()
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_are_disjoint() {
        assert_eq!(band_start(0), 1);
        assert_eq!(band_start(1), 100);
        assert_eq!(band_start(2), 200);

        for position in 0..5 {
            let last = band_start(position) + MAX_TEMPLATE_STEPS as u32 - 1;
            assert!(last < band_start(position + 1));
        }
    }

    #[test]
    fn test_normalize_selection() {
        assert_eq!(
            normalize_selection(&["international_crawler", " domestic_non_core", "international_crawler"]),
            vec!["international_crawler", "domestic_non_core"]
        );
        assert_eq!(
            normalize_selection(&["non_core_deployment", "domestic_non_core"]),
            vec!["domestic_non_core"]
        );
        assert_eq!(
            normalize_selection::<&str>(&[]),
            vec![DOMESTIC_NON_CORE, INTERNATIONAL_NON_CORE, INTERNATIONAL_CRAWLER]
        );
        assert_eq!(normalize_selection(&["", "  "]).len(), 3);
    }

    #[test]
    fn test_flow_label_fallback() {
        assert_eq!(
            flow_label(INTERNATIONAL_CRAWLER),
            ("International crawler".to_string(), "🕷️".to_string())
        );
        assert_eq!(
            flow_label("canary_rollout"),
            ("canary_rollout".to_string(), FALLBACK_FLOW_ICON.to_string())
        );
        assert!(is_builtin("non_core_deployment"));
        assert!(!is_builtin("canary_rollout"));
    }

    #[test]
    fn test_baselines_are_valid() {
        for info in &FLOW_TYPES {
            let template = baseline_template(info.key).unwrap();
            validate_template(info.key, &template).unwrap();
        }
        assert_eq!(baseline_template(DOMESTIC_NON_CORE).unwrap().len(), 16);
        assert_eq!(baseline_template(INTERNATIONAL_NON_CORE).unwrap().len(), 9);
        assert_eq!(baseline_template(INTERNATIONAL_CRAWLER).unwrap().len(), 7);
        assert!(baseline_template("canary_rollout").is_none());
    }

    #[test]
    fn test_plan_flow_steps_shifts_dependencies() {
        let template = baseline_template(INTERNATIONAL_CRAWLER).unwrap();
        let planned = plan_flow_steps(1, INTERNATIONAL_CRAWLER, &template).unwrap();

        assert_eq!(planned.len(), 7);
        assert_eq!(planned[0].step_order, 100);
        assert!(planned[0].dependencies.is_empty());
        assert_eq!(planned[1].step_order, 101);
        assert_eq!(planned[1].dependencies, vec![100]);
        assert_eq!(planned[6].step_order, 106);
        assert_eq!(planned[6].dependencies, vec![105]);
        assert!(planned.iter().all(|step| step.flow_type == INTERNATIONAL_CRAWLER));
    }

    #[test]
    fn test_plan_flow_steps_first_band_keeps_indices() {
        let template = baseline_template(DOMESTIC_NON_CORE).unwrap();
        let planned = plan_flow_steps(0, DOMESTIC_NON_CORE, &template).unwrap();

        for (index, step) in planned.iter().enumerate() {
            assert_eq!(step.step_order, index as u32 + 1);
            assert_eq!(step.dependencies, template[index].dependencies);
        }
    }

    #[test]
    fn test_plan_flow_steps_applies_default_links() {
        let template = vec![
            TemplateStepInput {
                step_name: "Check dashboards".into(),
                step_type: StepType::Verify,
                estimated_duration: None,
                dependencies: vec![],
                links: vec![],
            },
            TemplateStepInput {
                step_name: "Flip flag".into(),
                step_type: StepType::Config,
                estimated_duration: Some(1),
                dependencies: vec![1],
                links: vec![StepLink::new("Flag", "https://flags.example.com")],
            },
        ];
        let planned = plan_flow_steps(0, "canary", &template).unwrap();

        assert_eq!(planned[0].links, default_links(StepType::Verify));
        assert_eq!(planned[0].links[0].name, "Monitoring");
        assert_eq!(
            planned[1].links,
            vec![StepLink::new("Flag", "https://flags.example.com")]
        );
    }

    #[test]
    fn test_validate_template_rejects_bad_input() {
        let ok = TemplateStepInput {
            step_name: "One".into(),
            step_type: StepType::Deploy,
            estimated_duration: Some(3),
            dependencies: vec![],
            links: vec![],
        };

        assert!(validate_template("x", &[]).is_err());
        assert!(validate_template(" ", std::slice::from_ref(&ok)).is_err());

        let mut unnamed = ok.clone();
        unnamed.step_name = "  ".into();
        assert!(validate_template("x", &[unnamed]).is_err());

        let mut forward = ok.clone();
        forward.dependencies = vec![2];
        assert!(validate_template("x", &[ok.clone(), forward.clone()]).is_err());

        let mut self_ref = ok.clone();
        self_ref.dependencies = vec![1];
        assert!(validate_template("x", &[self_ref]).is_err());

        let mut zero = ok.clone();
        zero.dependencies = vec![0];
        assert!(validate_template("x", &[ok.clone(), zero]).is_err());

        let too_long = vec![ok.clone(); MAX_TEMPLATE_STEPS + 1];
        assert!(validate_template("x", &too_long).is_err());
        assert!(plan_flow_steps(0, "x", &too_long).is_err());

        let mut backward = ok.clone();
        backward.dependencies = vec![1];
        assert!(validate_template("x", &[ok, backward]).is_ok());
    }
}
