pub use duelink_core::{ClientId, RoomId};

pub mod model {
    pub use duelink_core::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use duelink_session::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use duelink_relay::*;
}

#[cfg(feature = "backend")]
pub mod backend {
    pub use duelink_backend::*;
}
