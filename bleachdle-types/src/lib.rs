pub mod character;
pub mod messages;

// Re-export all types
pub use character::*;
pub use messages::*;
