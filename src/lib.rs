pub mod address;
pub mod codec;
pub mod coin;
pub mod commands;
pub mod crypto;
pub mod hash;
pub mod transaction;
pub mod tx_handler;
pub mod utxo_pool;
pub mod validation;

pub use self::{
    address::*, codec::Format, coin::*, crypto::*, hash::*, transaction::*, tx_handler::*,
    utxo_pool::*, validation::*,
};
