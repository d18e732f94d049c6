//! # Segmentation Module
//!
//! Turns the frame timeline into windows ready for formation extraction.
//!
//! - `phase` - Possession-coherent phase detection
//! - `window` - Fixed-roster, bounded-duration windows per team and role

pub mod phase;
pub mod window;

pub use phase::{Phase, PhaseSegmenter};
pub use window::{Role, SideWindow, SlotOccupant, Window, WindowBuilder};
