pub mod migrate;
pub mod verify;
