//! pulse-core - Core library for Pulse
//!
//! This crate contains the marker models, payload normalization, region
//! lookup, moderation, the optimistic marker store and submission pipeline,
//! and the viewport logic used by every Pulse front end.

pub mod command;
pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod models;
pub mod moderation;
pub mod normalize;
pub mod remote;
pub mod resolver;
pub mod session;
pub mod store;
pub mod submission;
pub mod util;
pub mod viewport;

pub use command::MarkerCommand;
pub use config::{PulseConfig, RuntimeConfig};
pub use error::{Error, Result};
pub use models::{Coordinate, Identity, Marker, MarkerDraft, MarkerId, Urgency};
pub use session::{Notice, NoticeLevel, PulseSession};
