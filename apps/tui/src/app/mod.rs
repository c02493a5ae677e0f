// App module for prayer-times
// Keyboard state around the shared controller, plus the effect runner

pub mod effects;
pub mod input;
pub mod state;

pub use effects::EffectRunner;
pub use input::handle_input;
pub use state::{App, AppStore};
