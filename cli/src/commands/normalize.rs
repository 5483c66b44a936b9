use std::io::Read;
use std::path::PathBuf;

use stepwise_core::api::{AppConfig, CliError, ExecutionPlan, PlanNormalizer};
use stepwise_plugins::factory::build_normalizer;

use super::cli::{NormalizeArgs, PlanSourceArgs};

/// Read plan text from a file, or from stdin when `source` is `-`.
pub fn read_plan_text(source: &str) -> Result<String, CliError> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(source)
        .map_err(|e| CliError::Command(format!("read plan {} failed: {e}", source)))
}

pub fn plan_normalizer(cfg: &AppConfig, args: &PlanSourceArgs) -> Result<PlanNormalizer, CliError> {
    let mut normalizer_cfg = cfg.normalizer.clone();
    if let Some(name) = args.convention.as_deref() {
        normalizer_cfg.convention = Some(name.to_string());
    }
    let root = args.root.as_deref().map(PathBuf::from);

    build_normalizer(&normalizer_cfg, root.as_deref())
        .map_err(|e| CliError::Config(format!("{e:#}")))
}

pub fn load_plan(cfg: &AppConfig, args: &PlanSourceArgs) -> Result<ExecutionPlan, CliError> {
    let normalizer = plan_normalizer(cfg, args)?;
    let text = read_plan_text(&args.plan)?;
    let plan = normalizer.normalize_str(&text)?;
    tracing::info!(
        "Normalized plan '{}' into {} steps",
        plan.description,
        plan.len()
    );
    Ok(plan)
}

pub fn handle_normalize(args: NormalizeArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let plan = load_plan(cfg, &args.source)?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&plan)
    } else {
        serde_json::to_string(&plan)
    }
    .map_err(|e| CliError::Command(format!("serialize plan failed: {e}")))?;

    println!("{rendered}");
    Ok(0)
}
