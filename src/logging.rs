use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

/// Rolling daily file logging. The returned guard must stay alive for the
/// lifetime of the process or buffered lines are lost.
pub fn init(log_dir: &str) -> WorkerGuard {
    let file_appender = rolling::daily(log_dir, "timeledger.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    guard
}
