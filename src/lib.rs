mod repl;
mod storage;

pub use repl::*;
pub use storage::{Result, StoreError, Student, StudentStore};
