//! Optional live-target integrations.

#[cfg(feature = "partial-updates")]
pub mod live;

#[cfg(feature = "partial-updates")]
pub use live::LiveConfig;
