//! # Zonemix Library
//!
//! Zone-driven background music. A single [`system::MusicSystem`] owns two
//! playback slots and switches, fades, or cross-fades tracks as a listener
//! moves between overlapping zones. Each zone carries its own policy:
//! shuffle, pause cadence, long breaks, and switch styles.
//!
//! Playback is frame-polled: call [`system::MusicSystem::tick`] once per
//! frame with the elapsed seconds. Nothing blocks and no threads are spawned.
//!
//! ```
//! use zonemix_lib::clip::Clip;
//! use zonemix_lib::slot::VirtualSlot;
//! use zonemix_lib::system::MusicSystem;
//! use zonemix_lib::zone::{ZoneKind, ZoneSettings};
//!
//! let mut music = MusicSystem::new([VirtualSlot::new(), VirtualSlot::new()]);
//! music.add_zone(
//!     "world",
//!     ZoneKind::default(),
//!     ZoneSettings::with_tracks(vec![Clip::new("theme", 90.0)]),
//!     None,
//! );
//! music.start();
//! music.tick(1.0 / 60.0);
//! ```

pub mod clip;
pub mod config;
pub mod constants;
pub mod curve;
pub mod diagnostics;
pub mod mixer;
pub mod slot;
pub mod system;
pub mod zone;
