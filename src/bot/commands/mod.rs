//! Discord command implementations organized by category.

/// The adventure command family and its combat loop
pub mod adventure;

/// General utility commands
pub mod general;

/// Loadout and profile commands
pub mod loadout;

// Export commands
pub use adventure::*;
pub use general::*;
pub use loadout::*;
