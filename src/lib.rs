/// Use mimalloc as the global allocator.
/// Faster than glibc malloc for the many small allocations a line sort does,
/// with better thread-local caching and reduced fragmentation.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod logging;
pub mod sort;
