// Library crate: some public API items are only used by the binary
#![allow(unused)]

//! # pulseboard
//!
//! A CLI and library for probing a fleet of relay endpoints concurrently
//! and watching liveness and latency settle in a live status table.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐   ┌─────────┐   ┌────────┐   ┌─────────────┐  │
//! │  │orchestra-│──▶│ machine │──▶│ state  │──▶│  display    │  │
//! │  │tor (fan- │   │(per-    │   │(records│   │  (cadence   │  │
//! │  │out)      │   │ target) │   │+panel) │   │   loop)     │  │
//! │  └──────────┘   └────┬────┘   └────────┘   └──────┬──────┘  │
//! │                      │                            │         │
//! │                      ▼                            ▼         │
//! │                 ┌─────────┐                  ┌─────────┐    │
//! │                 │  probe  │                  │ render  │    │
//! │                 │ (HTTP)  │                  │ (pure)  │    │
//! │                 └─────────┘                  └─────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`probe`]**: one bounded request per call, classified as success,
//!   timeout, or failure; the [`Prober`] trait is the seam tests script
//! - **[`machine`]**: per-target retry loop and follow-up measurements
//! - **[`orchestrator`]**: launches every machine concurrently and resolves
//!   once all of them (and their follow-ups) have finished
//! - **[`state`]**: per-target records behind per-record locks, the shared
//!   in-flight counter, and point-in-time snapshots
//! - **[`render`]**: pure snapshot-to-string table rendering
//! - **[`display`]**: alternate-screen guard and the fixed-cadence loop
//!
//! ## Usage
//!
//! ```bash
//! # Probe the whole fleet
//! pulseboard
//!
//! # Probe only core-tier relays, with a fresh key prompt
//! pulseboard --tier core --reset-key
//! ```
//!
//! ### As a library
//!
//! ```
//! use pulseboard::{PanelState, Renderer, Target, Theme, Tier};
//!
//! let panel = PanelState::new(vec![Target::new("use1", "US East", Tier::Core)]);
//! let renderer = Renderer::new(Theme::dark(), 3000);
//! let frame = renderer.render(&panel.snapshot(0));
//! assert!(frame.contains("US East"));
//! ```

pub mod creds;
pub mod display;
pub mod machine;
pub mod orchestrator;
pub mod probe;
pub mod registry;
pub mod render;
pub mod settings;
pub mod state;
pub mod theme;

// Re-export main types for convenience
pub use probe::{HttpProber, Outcome, ProbeReport, Prober};
pub use registry::{Target, Tier};
pub use render::Renderer;
pub use settings::Settings;
pub use state::{PanelState, Phase, Slot, Snapshot, TargetRecord, TargetStatus};
pub use theme::Theme;
