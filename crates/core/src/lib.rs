//! Core types for the device simulation.
//!
//! This crate defines the fundamental abstractions shared by every
//! per-device model:
//!
//! - [`Event`]: All possible inputs to a device
//! - [`Action`]: All possible outputs from a device
//! - [`StateMachine`]: The trait every device model implements
//! - [`TimerId`]: The timer slots a device may arm
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────────────────────┐
//!  Event ──► │  DeviceStateMachine      │ ──► Vec<Action>
//!            │  (harvest, discovery,    │
//!            │   uplink)                │
//!            └──────────────────────────┘
//!                        ▲
//!                        │ set_time()
//!                 SimulationRunner
//! ```
//!
//! The runner owns time, the event queue, radios and reservoirs. Device
//! models only ever see events and hand back actions.

mod action;
mod event;
mod timer;
mod traits;

pub use action::{Action, Transmission};
pub use event::{Event, EventPriority};
pub use timer::TimerId;
pub use traits::StateMachine;
