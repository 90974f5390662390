pub mod auth;
pub mod cerebras;
pub mod db;
pub mod live;
pub mod security;
pub mod store;
