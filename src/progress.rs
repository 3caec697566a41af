//! Progress reporting hook.
//!
//! The library never sets up logging on its own. Callers hand an
//! [`Extractor`](crate::Extractor) a [`ProgressSink`] and receive
//! [`ProgressEvent`]s as clustering runs.

/// A structured progress notification.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    SearchStarted { max_colors: usize },
    ClusteringStarted { n_colors: usize },
    ClusteringFinished { n_colors: usize, inertia: f64 },
    /// `best_k` is `None` when the inertia curve has no knee.
    SearchFinished { best_k: Option<usize> },
}

/// Receiver for [`ProgressEvent`]s.
///
/// Must be `Sync`: the optimal-K search may cluster several sizes at once.
pub trait ProgressSink: Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSink;

impl ProgressSink for SilentSink {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Forwards events to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, event: &ProgressEvent) {
        match *event {
            ProgressEvent::SearchStarted { max_colors } => {
                log::info!("searching palette sizes 2..={max_colors}")
            }
            ProgressEvent::ClusteringStarted { n_colors } => {
                log::info!("started clustering for {n_colors} colors")
            }
            ProgressEvent::ClusteringFinished { n_colors, inertia } => {
                log::info!("finished clustering for {n_colors} colors (inertia {inertia:.1})")
            }
            ProgressEvent::SearchFinished { best_k: Some(k) } => {
                log::info!("optimal number of colors: {k}")
            }
            ProgressEvent::SearchFinished { best_k: None } => {
                log::warn!("no knee found in the inertia curve")
            }
        }
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &S {
    fn emit(&self, event: &ProgressEvent) {
        (**self).emit(event)
    }
}
