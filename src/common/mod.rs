pub mod lenient;
mod state;

pub use state::AppState;
