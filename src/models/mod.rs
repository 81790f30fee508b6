pub mod episode;
pub mod ledger_state;
pub mod loaders;

pub use episode::{Episode, EpisodeCatalog};
pub use ledger_state::{LedgerState, PublicationRecord};
pub use loaders::load_catalog;
