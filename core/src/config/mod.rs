mod load;
mod types;

pub use load::{get_stepwise_data_dir, load_default, load_from_path};
pub use types::{
    AppConfig, BatchConfig, LoggingConfig, NormalizerConfig, RetryConfig, SchedulerSection,
};
