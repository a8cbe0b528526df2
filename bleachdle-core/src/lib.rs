pub mod clock;
pub mod countdown;
pub mod error;
pub mod navigation;
pub mod render;
pub mod reveal;
pub mod session;
pub mod session_events;
pub mod variant;

// Re-export main components
pub use clock::*;
pub use countdown::*;
pub use error::*;
pub use navigation::*;
pub use render::*;
pub use reveal::*;
pub use session::*;
pub use session_events::*;
pub use variant::*;
