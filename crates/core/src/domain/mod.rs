pub mod order;
pub mod party;
pub mod product;
