pub mod axes;
pub mod search;
pub mod updates;

pub use axes::{RemoteAxes, VersionAxes};
pub use search::{CompatibilityResolver, CompatibilityResult, FailReason, SearchOutcome};
pub use updates::{check_engine, check_loader, check_mods, AxisUpdate, ModUpdate, ModUpdateReport};
