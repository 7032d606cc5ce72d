//! Core dispatch types.

mod builder;
mod manager;
mod registry;
mod reloader;
mod router;
mod settings;

#[cfg(feature = "validation")]
mod validation;

pub use builder::ManagerBuilder;
pub use manager::{Manager, ManagerRef};
pub use reloader::{ChangeHandler, FieldSetter, Reloader};
pub use settings::DispatchSettings;

#[cfg(feature = "validation")]
pub use validation::Validate;
