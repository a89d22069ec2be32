pub mod config;
pub mod engine;
pub mod error;
pub mod nn;
pub mod op;
pub mod viz;

pub use config::{BackwardConfig, GradClip};
pub use engine::{Value, ValueId, ValueType};
pub use error::{Error, Result};
pub use op::Op;

use std::sync::atomic::{AtomicUsize, Ordering};

///
/// NOTE: Refer safe singleton globals in Rust: https://stackoverflow.com/a/27826181/6196679
///
fn get_id() -> usize {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
