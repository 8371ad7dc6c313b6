/// Initialize tracing on stderr according to RUST_LOG and MEAL_PLANNER_LOG_FORMAT.
/// - Defaults to `warn` if `RUST_LOG` is unset so command output stays clean
/// - `MEAL_PLANNER_LOG_FORMAT=json` switches to JSON lines
pub fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    match std::env::var("MEAL_PLANNER_LOG_FORMAT").as_deref() {
        Ok("json") => {
            let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
        }
        _ => {
            let _ = builder.with(fmt_layer.compact()).try_init();
        }
    }
}
