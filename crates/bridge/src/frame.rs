//! Frame registry and the priority search that locates the editor frame.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::{BridgeError, Result};

/// Source-URL keywords that identify an editor frame when neither an element
/// id nor a container selector matches.
const SRC_KEYWORDS: &[&str] = &["pptist", "slides"];

/// Static description of an embedded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
	/// DOM element id, if the frame has one.
	pub element_id: Option<String>,
	/// Selector of the container the frame lives in, if known.
	pub container: Option<String>,
	/// Source URL of the frame document.
	pub src: String,
	/// Whether the frame document finished loading.
	pub loaded: bool,
}

/// A handle to one embedded frame's message-receiving endpoint.
///
/// The handle is not owned by the bridge: the underlying frame can be
/// replaced or removed at any time, in which case posting fails with
/// [`BridgeError::SendFailed`]. Callers should re-[`locate`](PageFrames::locate)
/// before every bridge operation rather than caching a handle across long
/// idle periods.
#[derive(Debug, Clone)]
pub struct FrameHandle {
	info: Arc<FrameInfo>,
	sink: mpsc::UnboundedSender<Envelope>,
}

impl FrameHandle {
	/// Whether the frame document finished loading.
	pub fn is_loaded(&self) -> bool {
		self.info.loaded
	}

	/// Source URL of the frame document.
	pub fn src(&self) -> &str {
		&self.info.src
	}

	/// DOM element id, if the frame has one.
	pub fn element_id(&self) -> Option<&str> {
		self.info.element_id.as_deref()
	}

	/// Post an envelope to the frame.
	///
	/// Fire-and-forget: a returned `Ok` means the message was handed to the
	/// frame's channel, not that the peer acted on it.
	///
	/// # Errors
	///
	/// [`BridgeError::SendFailed`] when the frame's message target is gone.
	pub fn post(&self, envelope: Envelope) -> Result<()> {
		self.sink.send(envelope).map_err(|_| BridgeError::SendFailed)
	}
}

/// Registry of the embedded frames currently on the page.
///
/// The embedding host registers a frame when it mounts one and removes it
/// when the element goes away. [`locate`](Self::locate) performs a pure
/// priority search over the registered frames; it has no side effects.
#[derive(Debug, Default)]
pub struct PageFrames {
	frames: Vec<FrameHandle>,
}

impl PageFrames {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a frame and return the receiving end of its inbox.
	///
	/// The returned receiver models the embedded document's message queue;
	/// dropping it invalidates every handle to this frame.
	pub fn register(&mut self, info: FrameInfo) -> mpsc::UnboundedReceiver<Envelope> {
		let (tx, rx) = mpsc::unbounded_channel();
		debug!(src = %info.src, id = ?info.element_id, "frame registered");
		self.frames.push(FrameHandle {
			info: Arc::new(info),
			sink: tx,
		});
		rx
	}

	/// Remove a frame by element id.
	pub fn remove(&mut self, element_id: &str) {
		self.frames
			.retain(|f| f.info.element_id.as_deref() != Some(element_id));
	}

	/// Remove every registered frame.
	pub fn clear(&mut self) {
		self.frames.clear();
	}

	/// Number of registered frames.
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Whether the registry is empty.
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// Locate the editor frame.
	///
	/// Search order, first match wins:
	/// 1. any of `candidate_ids`, in the given priority order;
	/// 2. the first frame inside any of `container_selectors`;
	/// 3. the first frame whose source URL contains a recognized keyword;
	/// 4. the first frame on the page;
	/// 5. `None` if no frame exists.
	pub fn locate(
		&self,
		candidate_ids: &[&str],
		container_selectors: &[&str],
	) -> Option<FrameHandle> {
		for id in candidate_ids {
			if let Some(frame) = self
				.frames
				.iter()
				.find(|f| f.info.element_id.as_deref() == Some(*id))
			{
				return Some(frame.clone());
			}
		}
		for selector in container_selectors {
			if let Some(frame) = self
				.frames
				.iter()
				.find(|f| f.info.container.as_deref() == Some(*selector))
			{
				return Some(frame.clone());
			}
		}
		if let Some(frame) = self
			.frames
			.iter()
			.find(|f| SRC_KEYWORDS.iter().any(|kw| f.info.src.contains(kw)))
		{
			return Some(frame.clone());
		}
		self.frames.first().cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn info(id: Option<&str>, container: Option<&str>, src: &str) -> FrameInfo {
		FrameInfo {
			element_id: id.map(str::to_owned),
			container: container.map(str::to_owned),
			src: src.to_owned(),
			loaded: true,
		}
	}

	#[test]
	fn id_match_beats_generic_frame() {
		let mut frames = PageFrames::new();
		let _generic = frames.register(info(None, None, "https://cdn.example/player.html"));
		let _editor = frames.register(info(Some("editor-frame"), None, "https://cdn.example/a"));
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();
		assert_eq!(handle.element_id(), Some("editor-frame"));
	}

	#[test]
	fn container_match_beats_keyword() {
		let mut frames = PageFrames::new();
		let _kw = frames.register(info(None, None, "https://cdn.example/pptist/index.html"));
		let _cont = frames.register(info(None, Some("#editor-root"), "https://cdn.example/b"));
		let handle = frames.locate(&["missing"], &["#editor-root"]).unwrap();
		assert_eq!(handle.src(), "https://cdn.example/b");
	}

	#[test]
	fn keyword_match_beats_first_frame() {
		let mut frames = PageFrames::new();
		let _plain = frames.register(info(None, None, "https://cdn.example/widget.html"));
		let _kw = frames.register(info(None, None, "https://cdn.example/pptist/index.html"));
		let handle = frames.locate(&[], &[]).unwrap();
		assert!(handle.src().contains("pptist"));
	}

	#[test]
	fn falls_back_to_first_frame() {
		let mut frames = PageFrames::new();
		let _a = frames.register(info(None, None, "https://cdn.example/a.html"));
		let _b = frames.register(info(None, None, "https://cdn.example/b.html"));
		let handle = frames.locate(&["missing"], &["#missing"]).unwrap();
		assert_eq!(handle.src(), "https://cdn.example/a.html");
	}

	#[test]
	fn empty_page_yields_none() {
		let frames = PageFrames::new();
		assert!(frames.locate(&["editor-frame"], &["#root"]).is_none());
	}

	#[test]
	fn post_to_removed_frame_fails() {
		let mut frames = PageFrames::new();
		let rx = frames.register(info(Some("editor-frame"), None, "https://cdn.example/a"));
		let handle = frames.locate(&["editor-frame"], &[]).unwrap();
		drop(rx);
		assert_eq!(handle.post(Envelope::Ping), Err(BridgeError::SendFailed));
	}
}
