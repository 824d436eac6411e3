pub mod events;
pub mod producer;
pub mod store;

pub use events::*;
pub use producer::*;
pub use store::*;
