pub mod broker;
pub mod db;
pub mod error;
pub mod guard;
