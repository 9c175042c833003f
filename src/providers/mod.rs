pub mod bank_table;

pub use bank_table::BankTableProvider;
