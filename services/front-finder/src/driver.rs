//! Detection loop over cases, configurations and time steps.

use front_detect::{detect_step, FieldSlice};
use tracing::{info, warn};
use verify_common::{ModelProvider, VerifyResult};

use crate::config::DetectConfig;
use crate::output;

/// Run detection for every (case, configuration) and write the front
/// tables, plus the per-step field dumps when configured.
pub fn run(cfg: &DetectConfig, models: &dyn ModelProvider) -> VerifyResult<()> {
    for case in &cfg.cases {
        for configuration in &cfg.configurations {
            detect_case(cfg, models, case, configuration)?;
        }
    }
    Ok(())
}

fn detect_case(
    cfg: &DetectConfig,
    models: &dyn ModelProvider,
    case: &str,
    configuration: &str,
) -> VerifyResult<()> {
    let series = models.load(case, configuration, &cfg.variable, &cfg.domain)?;
    info!(
        case,
        configuration,
        steps = series.len_times(),
        level = cfg.grid.level,
        "detecting fronts"
    );

    let mut labels = Vec::with_capacity(series.len_times());
    let mut columns = Vec::with_capacity(series.len_times());
    let mut lats: Vec<f64> = Vec::new();
    let mut found_steps = 0usize;

    for t in 0..series.len_times() {
        let theta = FieldSlice::new(series.ny, series.nx, series.field_slice(t).to_vec())?;
        let step = detect_step(&theta, &series.lats, &series.lons, &cfg.grid)?;

        info!(
            case,
            configuration,
            step = t,
            found = step.front.found,
            coverage_pct = step.front.coverage_pct,
            longest_run = step.front.longest_run,
            "detection step"
        );
        if step.front.found {
            found_steps += 1;
        }

        labels.push(series.times[t].format("%m%d%Y_%H%M").to_string());
        if lats.is_empty() {
            lats = step.front.lats.clone();
        }
        columns.push(step.front.lons);

        if cfg.save_fields {
            output::dump_field(
                &output::field_dump_path(&cfg.output_dir, "front", case, configuration, t),
                &step.gradient,
            )?;
            output::dump_field(
                &output::field_dump_path(&cfg.output_dir, "theta", case, configuration, t),
                &step.theta,
            )?;
        }
    }

    if found_steps == 0 {
        warn!(case, configuration, "no front found in any time step");
    }

    let path = output::front_table_path(&cfg.output_dir, case, configuration);
    output::write_front_table(&path, &labels, &lats, &columns)?;
    info!(case, configuration, found_steps, path = %path.display(), "wrote front table");
    Ok(())
}
