pub mod service;

pub use service::{qibla_for, resolve_place, Snapshot, TimingsService};
