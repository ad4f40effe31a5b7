/// State-change notifications emitted by the batch and ensemble machinery.
///
/// Collaborators (CLI, GUI) re-query state on notification; no payload beyond
/// the index of the finished unit is carried.
#[derive(Debug, Clone)]
pub enum ScreenEvent {
    DescriptorSettingsLoaded,
    ObservationSettingsLoaded,
    ObservationCompleted { index: usize },
    BatchCompleted,
    ModelFitted { index: usize },
    EnsembleCompleted,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(ScreenEvent) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: ScreenEvent) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn callback_receives_events() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(format!("{event:?}"));
        }));
        reporter.report(ScreenEvent::ObservationCompleted { index: 3 });
        reporter.report(ScreenEvent::BatchCompleted);
        drop(reporter);
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("index: 3"));
    }

    #[test]
    fn default_reporter_is_silent() {
        ProgressReporter::new().report(ScreenEvent::EnsembleCompleted);
    }
}
