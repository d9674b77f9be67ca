mod state;
mod store;

pub use state::GameSnapshot;
pub use store::{Action, GameStore, GameStoreConfig};

pub(crate) use state::{GameState, PhaseOutcome, RemoteOutcome};
