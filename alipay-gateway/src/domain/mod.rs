pub mod amount;
pub mod entities;
pub mod enums;
