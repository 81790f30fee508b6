pub mod content_transformer;
pub mod ledger;
pub mod notifier;

pub use content_transformer::{ContentTransformer, PostContent};
pub use ledger::PublicationLedger;
pub use notifier::TelegramNotifier;
