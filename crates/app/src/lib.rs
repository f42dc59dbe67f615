pub mod context;
pub mod settings;

pub use context::ChartApp;
pub use settings::{init_tracing, load_config};
