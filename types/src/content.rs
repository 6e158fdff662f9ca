pub mod parts;
pub mod turn;
