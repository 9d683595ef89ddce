pub mod address;
pub mod config;
pub mod hash;
pub mod signature;
pub mod transaction;
pub mod transaction_pool;
pub mod utxo_set;
pub mod validation;

pub use self::{
    address::*, config::*, hash::*, signature::*, transaction::*, transaction_pool::*,
    utxo_set::*, validation::*,
};
