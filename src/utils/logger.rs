use log::{Level, LevelFilter, Metadata, Record};

/// Logger implementation backed by the UART. Scheduler-internal logging is
/// kept sparse and capped at `Debug`: anything louder risks perturbing the
/// timing the scenario tests in `tests/` are trying to observe.
struct UartLogger;

impl log::Log for UartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            serial_println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: UartLogger = UartLogger;

/// Install the UART logger as the global `log` backend. Must run before
/// the trap vector goes live and interrupts are enabled, since nothing
/// serializes concurrent UART access beyond "only one hart, interrupts off
/// during boot".
pub fn init() {
    match log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug)) {
        Ok(()) => serial_println!("logger online"),
        Err(err) => panic!("failed to install logger: {}", err),
    }
}
