//! Application state and the render loop

pub mod render_loop;
pub mod session;
pub mod state;

pub use render_loop::RenderLoop;
pub use state::AppState;

#[cfg(test)]
pub mod test_support;
