pub mod draw;
pub mod prediction;
pub mod state;

pub use draw::*;
pub use prediction::*;
pub use state::*;
