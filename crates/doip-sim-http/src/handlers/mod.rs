//! Resource handlers for the control surface

mod overview;
mod platform;

pub use overview::SimulationOverviewHandler;
pub use platform::PlatformOverviewHandler;
