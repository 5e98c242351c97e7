pub mod predicate;
pub mod query;
pub mod scan;
