// Capturing logger for unit tests.
// Lines are kept per thread so parallel tests don't see each other.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static LINES: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl Log for Capture {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        LINES.with(|l| l.borrow_mut().push((record.level(), format!("{}", record.args()))));
    }

    fn flush(&self) {}
}

static LOGGER: Capture = Capture;

/// Install the logger (once per process) and clear this thread's lines.
pub fn init() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    let _ = take();
}

/// Lines logged on this thread since the last call.
pub fn take() -> Vec<(Level, String)> {
    LINES.with(|l| core::mem::take(&mut *l.borrow_mut()))
}

/// Lines at `level` or more severe.
pub fn take_at(level: Level) -> Vec<String> {
    take()
        .into_iter()
        .filter(|(l, _)| *l <= level)
        .map(|(_, s)| s)
        .collect()
}
