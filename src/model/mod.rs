//! Core data model types: account settings, attachments, and the registry
//! projection of an account.

pub mod account;
pub mod attachment;
pub mod settings;
