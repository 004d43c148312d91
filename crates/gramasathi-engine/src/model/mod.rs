//! Data model shared by the engine components.

mod outcome;
mod record;
mod selectors;
mod task;

pub use outcome::{InjectionOutcome, Snapshots, SubmissionOutcome, TaskReport};
pub use record::{FieldValue, UserRecord};
pub use selectors::{SelectorMap, SelectorTier, SUBMIT_KEY};
pub use task::{FormSource, Task, TaskStatus};

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
