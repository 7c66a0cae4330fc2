use std::sync::atomic::{AtomicUsize, Ordering};

static SERIAL_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Returns a process-wide unique serial, used to tell tree nodes apart in dumps.
pub fn next_serial() -> usize {
    SERIAL_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Hands out assembly label names that are unique within one compilation.
///
/// The `$` separator keeps generated labels out of the identifier namespace of the source language.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    counter: usize,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_label(&mut self, prefix: &str) -> String {
        let label = format!("{}${}", prefix, self.counter);
        self.counter += 1;
        label
    }
}
