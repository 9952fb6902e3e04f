pub mod db;
pub mod error;
pub mod item;
pub mod kind;
pub mod library;
pub mod options;
