mod ws_room_channel;

pub use ws_room_channel::WsRoomChannel;
