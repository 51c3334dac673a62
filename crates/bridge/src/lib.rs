//! Host-side bridge to the embedded presentation editor frame.
//!
//! The editor runs as an independently-loaded application inside an isolated
//! frame and is reachable only through an asynchronous, untyped message
//! channel. This crate provides the protocol layer on top of that channel:
//!
//! * [`Envelope`]: the wire format shared by every message.
//! * [`PageFrames`]: registry of embedded frames and the priority search
//!   that locates the editor frame among them.
//! * [`BridgeSession`]: per-page session state (readiness latch, forward-only
//!   state machine, inbound event hub, request-id generation).
//! * [`wait_for_ready`]: the readiness handshake.
//! * [`send_command`] / [`send_awaiting`]: fire-and-forget dispatch and
//!   correlated request/response.
//! * [`RetryPolicy`]: bounded fixed-delay retries around fallible steps.
//! * [`EditorBridge`]: the typed operation surface a host page uses.
//!
//! Bridge failures never cross the message boundary as panics; every
//! operation resolves to a [`BridgeError`] or an explicit `false`/empty
//! outcome the caller can surface.

#![warn(missing_docs)]

mod channel;
mod correlate;
mod editor;
mod envelope;
mod error;
mod frame;
mod probe;
mod retry;
mod session;

pub use channel::send_command;
pub use correlate::send_awaiting;
pub use editor::{
	Direction, EditorBridge, LoadedPresentation, LocatorConfig, PresentationSource, SlideChange,
	SlideChanges,
};
pub use envelope::{Envelope, EventFrame, ImportPayload, command, event};
pub use error::{BridgeError, Result};
pub use frame::{FrameHandle, FrameInfo, PageFrames};
pub use probe::{ProbeConfig, wait_for_ready};
pub use retry::RetryPolicy;
pub use session::{BridgeSession, BridgeState, EventStream};
