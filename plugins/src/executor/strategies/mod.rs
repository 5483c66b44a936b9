pub mod retry;

pub use retry::{exponential_from_config, FixedDelayPlugin, LinearBackoffPlugin};
