pub mod add;
pub mod common;
pub mod delete;
pub mod export;
pub mod list;
pub mod moderate;
pub mod places;
pub mod stats;
