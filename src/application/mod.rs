// Application layer: the ledger rules and the services built on top of them.

pub mod agreements;
pub mod error;
pub mod ledger;
pub mod orchestrator;

pub use agreements::*;
pub use error::*;
pub use ledger::*;
pub use orchestrator::*;
