use serde::Serialize;

/// A snapshot of optimizer state, emitted once per reported iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptProgress {
    /// Reported iteration number (monotonically non-decreasing).
    pub iteration: usize,
    /// Energy at this point (kcal/mol).
    pub energy: f64,
    /// Per-atom RMS gradient norm (kcal/mol/Å).
    pub grad_rms: f64,
    /// Owned positions snapshot; absent when trajectory storage is off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<f64>>,
}

pub type ProgressCallback<'a> = Box<dyn Fn(&OptProgress) + Send + Sync + 'a>;

/// Forwards progress records to an optional callback, synchronously on the
/// optimizer's thread.
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
    pub fn report(&self, record: &OptProgress) {
        if let Some(cb) = &self.callback {
            cb(record);
        }
    }
}
