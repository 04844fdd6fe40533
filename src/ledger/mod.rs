//! Account balances, the transaction log and the operations that change them.

mod account;
mod amount;
mod operations;
mod transaction;

pub use account::{Account, get_account};
pub use amount::Amount;
pub use operations::{Receipt, TransferReceipt, fund, history, transfer, withdraw};
pub use transaction::{
    Transaction, TransactionID, TransactionKind, TransactionStatus, create_transaction_table,
};
