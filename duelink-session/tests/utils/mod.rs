pub mod media;
pub mod session_helpers;

pub use media::*;
pub use session_helpers::*;
