pub mod ledger;
pub mod prediction;
pub mod tick;
