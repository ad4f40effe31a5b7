pub mod descriptors;
pub mod model;
pub mod screen;

use indicatif::{ProgressBar, ProgressStyle};
use mantoqsar::engine::progress::{ProgressReporter, ScreenEvent};

/// A progress bar driven by the core's screen events.
pub fn progress_reporter(total: u64, label: &str) -> (ProgressBar, ProgressReporter<'static>) {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .expect("static template is valid")
            .progress_chars("=> "),
    );
    bar.set_message(label.to_string());

    let bar_handle = bar.clone();
    let reporter = ProgressReporter::with_callback(Box::new(move |event| match event {
        ScreenEvent::ObservationCompleted { .. } | ScreenEvent::ModelFitted { .. } => {
            bar_handle.inc(1);
        }
        ScreenEvent::BatchCompleted | ScreenEvent::EnsembleCompleted => {
            bar_handle.finish_and_clear();
        }
        _ => {}
    }));
    (bar, reporter)
}
