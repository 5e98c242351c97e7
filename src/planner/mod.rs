pub mod error;
pub mod parser;
pub mod query_intent;
