use crate::cli::ModelArgs;
use crate::data::{self, JsonCheckpointStore};
use crate::error::Result;
use mantoqsar::core::models::molecule::Molecule;
use mantoqsar::engine::batch::{self, CheckpointStore};
use mantoqsar::engine::context::ScreenContext;
use mantoqsar::workflows::model::{self, ModelResult};
use tracing::info;

pub fn run(args: ModelArgs) -> Result<()> {
    let project = args.project.project.as_path();

    let observations = data::load_observations(&project.join(&args.project.observations))?;
    let config = data::load_run_config(&project.join(&args.config))?;

    let store = JsonCheckpointStore::new(project.join(&args.project.checkpoint));
    let results = store.load().map_err(crate::error::CliError::Calc)?;
    info!(observations = results.len(), "loaded descriptor checkpoint");

    // The descriptor values are already computed; the context only carries
    // the observation metadata for row selection.
    let molecules = vec![Molecule::default(); observations.len()];
    let ctx = ScreenContext::new(Vec::new(), observations, molecules)
        .map_err(crate::error::CliError::Calc)?;

    let model_matrix = batch::model_descriptor_matrix(&ctx, &results);
    let predict_matrix = batch::predict_descriptor_matrix(&ctx, &results);
    let names = batch::descriptor_names(&results);

    let predict_data = if predict_matrix.rows() > 0 {
        Some((predict_matrix, ctx.predict_property()))
    } else {
        None
    };

    let ensemble_config = config.to_ensemble_config();
    let (_bar, reporter) =
        super::progress_reporter(ensemble_config.members as u64, "fitting ensemble");

    let result = model::fit_ensemble(
        model_matrix,
        ctx.model_property(),
        predict_data,
        ensemble_config,
        &reporter,
        args.parallel,
    )?;

    print_report(&result, &names);
    Ok(())
}

pub(crate) fn print_report(result: &ModelResult, names: &[String]) {
    println!(
        "ensemble: {}/{} members passed the quality thresholds",
        result.surviving_members, result.total_members
    );
    match result.r_square {
        Some(r2) => println!("model r-square:      {r2:.4}"),
        None => println!("model r-square:      no data"),
    }
    match result.predictive_r_square {
        Some(r2) => println!("predictive r-square: {r2:.4}"),
        None => println!("predictive r-square: no data"),
    }

    let mut ranked: Vec<(usize, f64, usize)> = result
        .descriptor_importance
        .iter()
        .zip(&result.selection_counts)
        .enumerate()
        .filter(|(_, (importance, _))| **importance > 0.0)
        .map(|(i, (importance, count))| (i, *importance, *count))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    if !ranked.is_empty() {
        println!("descriptor importance (sum |coefficient|, selections):");
        for (index, importance, count) in ranked {
            let name = names.get(index).map(String::as_str).unwrap_or("?");
            println!("{index:>5}  {name:<32} {importance:>12.4}  {count:>4}");
        }
    }
}
