//! HUD view models

pub mod fire;
pub mod renderer;
pub mod session;

pub use renderer::{HudRenderer, HudView, InputShape, PanelChange};
pub use session::SessionView;
