mod command_bus;

pub use command_bus::CommandBus;
