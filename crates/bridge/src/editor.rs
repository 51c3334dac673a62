//! Typed operation surface over the raw bridge.
//!
//! [`EditorBridge`] is what a host page actually holds: it owns the
//! session, re-locates the editor frame before every operation, and wraps
//! the handshake and the load path in the default retry policy.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::channel::send_command;
use crate::correlate::send_awaiting;
use crate::envelope::{Envelope, EventFrame, ImportPayload, command, event};
use crate::error::{BridgeError, Result};
use crate::frame::{FrameHandle, PageFrames};
use crate::probe::{ProbeConfig, wait_for_ready};
use crate::retry::RetryPolicy;
use crate::session::{BridgeSession, EventStream};

/// Where the editor frame is expected to live on the page.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
	/// Element ids tried first, in priority order.
	pub candidate_ids: Vec<String>,
	/// Container selectors tried next.
	pub container_selectors: Vec<String>,
}

impl Default for LocatorConfig {
	fn default() -> Self {
		Self {
			candidate_ids: vec!["pptist-frame".to_owned(), "ppt-editor-frame".to_owned()],
			container_selectors: vec![
				"#ppt-editor-container".to_owned(),
				".pptist-container".to_owned(),
			],
		}
	}
}

/// What to load into the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationSource {
	/// Fetchable presentation file.
	Url(String),
	/// Inline presentation document (slides, thumbnails, ...).
	Document(Value),
}

impl PresentationSource {
	fn into_payload(self) -> Value {
		match self {
			Self::Url(url) => json!({ "url": url }),
			Self::Document(doc) => doc,
		}
	}
}

/// Editor reply to a successful presentation load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedPresentation {
	/// Slide count of the loaded presentation.
	#[serde(default)]
	pub total_slides: u32,
	/// Thumbnail URLs, one per slide, when the editor produced them.
	#[serde(default)]
	pub thumbnails: Vec<String>,
}

/// A `slide-change` notification from the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideChange {
	/// Index of the slide now visible.
	pub current_index: u32,
	/// Slide count at the time of the change.
	#[serde(default)]
	pub total_slides: u32,
}

/// Navigation direction for [`EditorBridge::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// One slide back.
	Prev,
	/// One slide forward.
	Next,
}

impl Direction {
	fn as_str(self) -> &'static str {
		match self {
			Self::Prev => "prev",
			Self::Next => "next",
		}
	}
}

/// Host-page handle to the embedded presentation editor.
///
/// Clones share the same session and frame registry, so one page holds one
/// logical bridge regardless of how many call sites use it.
#[derive(Clone)]
pub struct EditorBridge {
	session: Arc<BridgeSession>,
	frames: Arc<RwLock<PageFrames>>,
	locator: LocatorConfig,
	probe: ProbeConfig,
	retry: RetryPolicy,
	request_timeout: Duration,
}

impl EditorBridge {
	/// Create a bridge over the page's frame registry.
	pub fn new(frames: Arc<RwLock<PageFrames>>) -> Self {
		Self {
			session: Arc::new(BridgeSession::new()),
			frames,
			locator: LocatorConfig::default(),
			probe: ProbeConfig::default(),
			retry: RetryPolicy::default(),
			request_timeout: Duration::from_secs(10),
		}
	}

	/// Override the frame locator configuration.
	#[must_use]
	pub fn with_locator(mut self, locator: LocatorConfig) -> Self {
		self.locator = locator;
		self
	}

	/// Override the readiness probe configuration.
	#[must_use]
	pub fn with_probe(mut self, probe: ProbeConfig) -> Self {
		self.probe = probe;
		self
	}

	/// Override the retry policy for the handshake and the load path.
	#[must_use]
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	/// Override the per-request timeout for correlated commands.
	#[must_use]
	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// The underlying session.
	///
	/// The embedding host delivers inbound frame messages through
	/// [`BridgeSession::deliver`] on this session.
	pub fn session(&self) -> &BridgeSession {
		&self.session
	}

	/// Locate the editor frame, fresh for this operation.
	///
	/// # Errors
	///
	/// [`BridgeError::FrameNotFound`] when no frame exists on the page.
	pub fn locate(&self) -> Result<FrameHandle> {
		let ids: Vec<&str> = self.locator.candidate_ids.iter().map(String::as_str).collect();
		let containers: Vec<&str> = self
			.locator
			.container_selectors
			.iter()
			.map(String::as_str)
			.collect();
		self.frames
			.read()
			.locate(&ids, &containers)
			.ok_or(BridgeError::FrameNotFound)
	}

	/// Run the readiness handshake, retrying per the bridge policy.
	///
	/// # Errors
	///
	/// [`BridgeError::FrameNotFound`] when no frame exists;
	/// [`BridgeError::HandshakeTimeout`] when every attempt stayed silent.
	pub async fn ensure_ready(&self) -> Result<()> {
		self.retry
			.run(|| async move {
				let handle = self.locate()?;
				if wait_for_ready(&self.session, Some(&handle), &self.probe).await {
					Ok(())
				} else {
					Err(BridgeError::HandshakeTimeout)
				}
			})
			.await
	}

	/// Load a presentation into the editor.
	///
	/// Correlated `load-ppt`: success arrives as `ppt-loaded`, failure as
	/// `ppt-load-error`. Retried per the bridge policy.
	///
	/// # Errors
	///
	/// [`BridgeError::LoadRejected`] when the editor reported a load error,
	/// [`BridgeError::LoadTimeout`] when no terminal event arrived, plus the
	/// locate/handshake errors of [`ensure_ready`](Self::ensure_ready).
	pub async fn load_presentation(
		&self,
		source: PresentationSource,
	) -> Result<LoadedPresentation> {
		self.ensure_ready().await?;
		let payload = source.into_payload();
		let frame = self
			.retry
			.run(|| {
				let payload = payload.clone();
				async move {
					let handle = self.locate()?;
					let frame = send_awaiting(
						&self.session,
						&handle,
						command::LOAD_PPT,
						payload,
						|frame| {
							frame.action == event::PPT_LOADED
								|| frame.action == event::PPT_LOAD_ERROR
						},
						self.request_timeout,
					)
					.await
					.map_err(|err| match err {
						BridgeError::RequestTimeout(_) => BridgeError::LoadTimeout,
						BridgeError::PeerRejected { message, .. } => {
							BridgeError::LoadRejected(message)
						}
						other => other,
					})?;
					// Some editor builds report the failure in the payload
					// instead of the envelope error field.
					if frame.action == event::PPT_LOAD_ERROR {
						let message = frame
							.data
							.get("error")
							.and_then(Value::as_str)
							.unwrap_or("presentation load failed")
							.to_owned();
						return Err(BridgeError::LoadRejected(message));
					}
					Ok(frame)
				}
			})
			.await?;
		let loaded: LoadedPresentation = serde_json::from_value(frame.data).unwrap_or_else(|err| {
			debug!(error = %err, "ppt-loaded payload not in the expected shape");
			LoadedPresentation {
				total_slides: 0,
				thumbnails: Vec::new(),
			}
		});
		Ok(loaded)
	}

	/// Ask the editor for its current presentation document.
	///
	/// # Errors
	///
	/// [`BridgeError::RequestTimeout`] when the editor stays silent, or the
	/// locate/send errors.
	pub async fn request_presentation_data(&self) -> Result<Value> {
		let handle = self.locate()?;
		let frame = send_awaiting(
			&self.session,
			&handle,
			command::GET_PPT_DATA,
			json!({}),
			|frame| frame.action == event::PPT_DATA,
			self.request_timeout,
		)
		.await?;
		Ok(frame.data)
	}

	/// Step one slide forward or back.
	///
	/// # Errors
	///
	/// Locate and send errors only; the command is fire-and-forget.
	pub fn navigate(&self, direction: Direction) -> Result<()> {
		let handle = self.locate()?;
		send_command(
			&handle,
			command::NAVIGATE,
			json!({ "direction": direction.as_str() }),
		)
	}

	/// Jump to a slide by index.
	///
	/// # Errors
	///
	/// Locate and send errors only; the command is fire-and-forget.
	pub fn goto_slide(&self, index: u32) -> Result<()> {
		let handle = self.locate()?;
		send_command(&handle, command::GOTO_SLIDE, json!({ "index": index }))
	}

	/// Toggle the drawing overlay.
	///
	/// # Errors
	///
	/// Locate and send errors only; the command is fire-and-forget.
	pub fn toggle_drawing(&self) -> Result<()> {
		let handle = self.locate()?;
		send_command(&handle, command::TOGGLE_DRAWING, json!(null))
	}

	/// Post a file to the host's own import pipeline.
	///
	/// Loopback: the envelope goes onto the session hub, not to the frame,
	/// and whoever subscribed for imports picks it up.
	pub fn import_file(&self, name: impl Into<String>, content: impl Into<String>) {
		self.session.deliver(Envelope::Import {
			data: ImportPayload {
				name: name.into(),
				content: content.into(),
			},
		});
	}

	/// Subscribe to `slide-change` notifications.
	pub fn slide_changes(&self) -> SlideChanges {
		SlideChanges {
			events: self.session.events(),
		}
	}
}

impl std::fmt::Debug for EditorBridge {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EditorBridge")
			.field("state", &self.session.state())
			.field("retry", &self.retry)
			.field("request_timeout", &self.request_timeout)
			.finish_non_exhaustive()
	}
}

/// Stream of `slide-change` notifications.
#[derive(Debug)]
pub struct SlideChanges {
	events: EventStream,
}

impl SlideChanges {
	/// Next slide change, or `None` when the session is gone.
	pub async fn next(&mut self) -> Option<SlideChange> {
		loop {
			let frame: EventFrame = self.events.next_event().await?;
			if frame.action != event::SLIDE_CHANGE {
				continue;
			}
			match serde_json::from_value(frame.data) {
				Ok(change) => return Some(change),
				Err(err) => debug!(error = %err, "malformed slide-change payload"),
			}
		}
	}
}
