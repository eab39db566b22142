//! Recording and listing income and expense transactions.

mod core;
mod create_endpoint;
mod create_page;
mod transactions_page;

pub use core::{
    Transaction, TransactionBuilder, TransactionId, TransactionRow, count_transactions,
    create_transaction, create_transaction_table, get_transaction, get_transaction_row,
    get_transaction_rows, validate_amount,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::{get_register_fields, get_register_page};
pub use transactions_page::get_transactions_page;
