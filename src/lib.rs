//! `mailrecord` — record model and wire codecs for a mail UI provider layer.
//!
//! This crate provides the core value types exchanged between a mail backend
//! and its hosting UI: per-account [`SettingsRecord`](model::settings::SettingsRecord)s
//! and per-message [`AttachmentRecord`](model::attachment::AttachmentRecord)s,
//! each losslessly convertible among three external representations (a
//! positional binary stream, a tabular row and a JSON document), plus a
//! concurrent [`AccountRegistry`](registry::AccountRegistry) that holds
//! externally registered account projections and broadcasts change
//! notifications.

pub mod codec;
pub mod error;
pub mod mime;
pub mod model;
pub mod registry;
