//! Evaluate [`Agent`](crate::Agent) on a separate environment.
mod eval_runner;
mod trajectory;
pub use eval_runner::{EvalRunner, EvalSession};
