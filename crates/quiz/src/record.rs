//! Canonical quiz record types.

use serde::{Deserialize, Serialize};

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
	/// Option identifier, usually a letter.
	pub id: String,
	/// Display text.
	pub text: String,
}

/// The canonical question record every backend payload is normalized into.
///
/// Never mutated after construction; soft-deleted records are filtered out
/// before a caller ever sees the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
	/// Record identifier.
	pub id: String,
	/// Question text.
	pub question_text: String,
	/// Question kind, e.g. `choice`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Answer options, in display order.
	pub options: Vec<QuestionOption>,
	/// Expected answer.
	pub answer: String,
	/// Explanation shown after answering.
	pub explanation: String,
	/// Chapter the question belongs to.
	pub chapter_id: String,
	/// Difficulty label, e.g. `medium`.
	pub difficulty: String,
	/// Sort key within the chapter.
	pub order: i64,
	/// Soft-delete flag from the backend.
	pub is_deleted: bool,
}
