//! Feature-gated diagnostics: when the `logging` feature is off, `log::*` expands to
//! nothing and `tracing` never enters the dependency graph of a consumer that doesn't
//! want it.

#[cfg(not(feature = "logging"))]
pub(crate) mod log {
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
    pub(crate) use {debug, trace, warn};
}

#[cfg(feature = "logging")]
pub(crate) mod log {
    pub(crate) use tracing::{debug, trace, warn};
}
