use crate::cli::{DescriptorsArgs, ProjectArgs, ScreenArgs};
use crate::data;
use crate::error::Result;
use mantoqsar::workflows::model;

pub fn run(args: ScreenArgs) -> Result<()> {
    let project = args.project.project.clone();
    let descriptor_args = DescriptorsArgs {
        project: ProjectArgs {
            project: project.clone(),
            observations: args.project.observations.clone(),
            descriptors: args.project.descriptors.clone(),
            checkpoint: args.project.checkpoint.clone(),
        },
        parallel: args.parallel,
    };

    let screened = super::descriptors::compute(&descriptor_args)?;
    println!(
        "descriptor matrix: {} observations x {} descriptors",
        screened.descriptor_matrix.rows(),
        screened.descriptor_matrix.cols()
    );

    let config = data::load_run_config(&project.join(&args.config))?;
    let predict_data = if screened.predict_matrix.rows() > 0 {
        Some((screened.predict_matrix.clone(), screened.predict_property.clone()))
    } else {
        None
    };

    let ensemble_config = config.to_ensemble_config();
    let (_bar, reporter) =
        super::progress_reporter(ensemble_config.members as u64, "fitting ensemble");

    let result = model::fit_ensemble(
        screened.model_matrix.clone(),
        screened.model_property.clone(),
        predict_data,
        ensemble_config,
        &reporter,
        args.parallel,
    )?;

    super::model::print_report(&result, &screened.descriptor_names);
    Ok(())
}
