//! Collaborators for the stepwise engine: where ignore rules and conventions
//! come from, how retries back off, how scheduler events are rendered, and
//! how plan steps are executed.

pub mod conventions;
pub mod executor;
pub mod factory;
pub mod ignore;
