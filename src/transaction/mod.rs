/// Transaction builder module for validating and constructing mint and claim calls
pub mod builder;

pub use builder::{
	MintTransactionBuilder, PreparedTransaction, SaleKind, TransactionError, build_claim,
};
