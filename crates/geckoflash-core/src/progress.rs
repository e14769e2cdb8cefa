//! Progress reporting for long-running operations
//!
//! Erase and program loops report fractional completion through this
//! observer instead of printing; the caller decides what a percentage looks
//! like (progress bar, log line, nothing).

/// Observer invoked with a percentage in `[0, 100]` after each unit of work
/// (one erased page, one programmed word). Purely observational.
pub trait Progress {
    /// Report completion as a percentage in `[0, 100]`
    fn report(&mut self, percent: f32);
}

/// Sink that discards all reports
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _percent: f32) {}
}

/// Adapter turning a closure into a [`Progress`] sink
pub struct FnProgress<F: FnMut(f32)>(pub F);

impl<F: FnMut(f32)> Progress for FnProgress<F> {
    fn report(&mut self, percent: f32) {
        (self.0)(percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink() {
        let mut last = 0.0f32;
        {
            let mut sink = FnProgress(|p: f32| last = if p > last { p } else { last });
            let progress: &mut dyn Progress = &mut sink;
            progress.report(25.0);
            progress.report(100.0);
        }
        assert_eq!(last, 100.0);
    }
}
