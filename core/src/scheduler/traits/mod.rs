pub mod observer;
pub mod retry;

pub use observer::*;
pub use retry::*;
