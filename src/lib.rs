pub mod affix;
pub mod cache;
pub mod combined;
pub mod config;
pub mod dict;
pub mod dicttool;
pub mod error;
pub mod frequency;
// cmd and reports are modules of the binary (main.rs).
