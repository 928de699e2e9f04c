//! State module for tracking page task progress
//!
//! # Components
//!
//! - `TaskState`: the lifecycle of one page task (attempting, succeeded,
//!   abandoned, aborted)

mod task_state;

pub use task_state::TaskState;
