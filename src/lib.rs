//! Companion service for an NFT collection sale: keeps a wallet session in sync with the sale
//! contract, proves whitelist membership off-chain and submits mint and claim transactions.

pub mod chain;
pub mod config;
pub mod transaction;
pub mod utils;
pub mod wallet;
pub mod whitelist;
