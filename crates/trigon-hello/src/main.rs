use trigon_engine::config::AppConfig;
use trigon_engine::logging::{init_logging, LoggingConfig};
use trigon_engine::window::Runtime;

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(e) = Runtime::run(AppConfig::default()) {
        log::error!("fatal: {e:#}");
        std::process::exit(-1);
    }
}
