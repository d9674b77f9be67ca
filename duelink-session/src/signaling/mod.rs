mod memory;
mod room_channel;

pub use memory::MemoryRelay;
pub use room_channel::RoomChannel;
