use crate::cli::DescriptorsArgs;
use crate::data::{self, FileSurfaceProvider, JsonCheckpointStore};
use crate::error::Result;
use mantoqsar::engine::batch::CheckpointStore;
use mantoqsar::engine::context::ScreenContext;
use mantoqsar::engine::progress::ScreenEvent;
use mantoqsar::workflows::screen::{self, ScreenOptions, ScreenResult};
use tracing::info;

pub fn run(args: DescriptorsArgs) -> Result<()> {
    let result = compute(&args)?;
    print_summary(&result);
    Ok(())
}

pub(crate) fn compute(args: &DescriptorsArgs) -> Result<ScreenResult> {
    let project = args.project.project.as_path();

    let observations = data::load_observations(&project.join(&args.project.observations))?;
    let descriptor_sets = data::load_descriptor_sets(&project.join(&args.project.descriptors))?;
    let molecules = data::load_molecules(project, &observations);

    let mut ctx = ScreenContext::new(descriptor_sets, observations, molecules)
        .map_err(crate::error::CliError::Calc)?;

    let provider = FileSurfaceProvider::new(project);
    let store = JsonCheckpointStore::new(project.join(&args.project.checkpoint));

    let (_bar, reporter) = super::progress_reporter(
        ctx.observation_count() as u64,
        "computing descriptors",
    );
    reporter.report(ScreenEvent::DescriptorSettingsLoaded);
    reporter.report(ScreenEvent::ObservationSettingsLoaded);

    let result = screen::run(
        &mut ctx,
        &provider,
        // The parallel path recomputes everything; only the sequential path
        // checkpoints and resumes.
        if args.parallel {
            None
        } else {
            Some(&store as &dyn CheckpointStore)
        },
        &reporter,
        ScreenOptions {
            parallel: args.parallel,
        },
    )?;

    if args.parallel {
        store.save(&result.results)?;
    }
    info!(path = %store.path().display(), "descriptor checkpoint written");
    Ok(result)
}

fn print_summary(result: &ScreenResult) {
    println!(
        "descriptor matrix: {} observations x {} descriptors",
        result.descriptor_matrix.rows(),
        result.descriptor_matrix.cols()
    );
    println!(
        "model rows: {}, predict rows: {}",
        result.model_matrix.rows(),
        result.predict_matrix.rows()
    );
    for (i, name) in result.descriptor_names.iter().enumerate() {
        println!("{i:>5}  {name}");
    }
}
