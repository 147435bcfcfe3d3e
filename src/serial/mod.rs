//! Per-row serial allocation.

mod allocator;

pub use allocator::{SerialAllocator, SerialStrategy};
