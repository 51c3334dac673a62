//! Payload normalization: heterogeneous backend shapes to canonical records.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::record::{QuestionOption, QuestionRecord};

/// Non-fatal conditions reported by the normalizer.
///
/// These are data quality signals, not errors: the caller still gets the
/// best list the payload allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeIssue {
	/// The payload matched none of the known shapes.
	ShapeUnrecognized,
	/// An options field could not be parsed; the question kept an empty list.
	OptionsParse {
		/// Id of the affected question, when one was available.
		question_id: String,
		/// Parser error detail.
		detail: String,
	},
}

/// Result of a normalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
	/// Canonical records, soft-deleted entries removed, sorted by `order`.
	pub questions: Vec<QuestionRecord>,
	/// Conditions encountered along the way.
	pub issues: Vec<NormalizeIssue>,
}

/// Normalize a backend payload into canonical question records.
///
/// Accepted shapes:
/// * `[...]` — a bare array of records;
/// * `{"questions": [...]}`;
/// * `{"code": 200, "data": [...]}` (or any object with a `data` array);
/// * `{"data": {"questions": [...]}}`;
/// * `{"data": {<id>: {...}, ...}}` — a map keyed by id, values taken.
///
/// Anything else yields an empty list plus
/// [`NormalizeIssue::ShapeUnrecognized`]. Records whose soft-delete flag is
/// set are dropped; the survivors are sorted ascending by `order` with ties
/// keeping their input order.
pub fn normalize(raw: &Value, fallback_chapter_id: &str) -> Normalized {
	let mut issues = Vec::new();
	let Some(items) = extract_items(raw) else {
		warn!("question payload shape unrecognized");
		issues.push(NormalizeIssue::ShapeUnrecognized);
		return Normalized {
			questions: Vec::new(),
			issues,
		};
	};

	let mut questions: Vec<QuestionRecord> = items
		.iter()
		.filter_map(|item| normalize_item(item, fallback_chapter_id, &mut issues))
		.filter(|record| !record.is_deleted)
		.collect();
	questions.sort_by_key(|record| record.order);
	Normalized { questions, issues }
}

/// Pull the record list out of whichever container shape the payload uses.
fn extract_items(raw: &Value) -> Option<Vec<Value>> {
	match raw {
		Value::Array(items) => Some(items.clone()),
		Value::Object(map) => {
			if let Some(Value::Array(items)) = map.get("questions") {
				return Some(items.clone());
			}
			match map.get("data") {
				Some(Value::Array(items)) => Some(items.clone()),
				Some(Value::Object(data)) => {
					if let Some(Value::Array(items)) = data.get("questions") {
						Some(items.clone())
					} else {
						// A map keyed by id: take all values.
						Some(data.values().cloned().collect())
					}
				}
				_ => None,
			}
		}
		_ => None,
	}
}

fn normalize_item(
	item: &Value,
	fallback_chapter_id: &str,
	issues: &mut Vec<NormalizeIssue>,
) -> Option<QuestionRecord> {
	let Value::Object(fields) = item else {
		debug!("skipping non-object question entry");
		return None;
	};

	let id = text_field(fields, &["id", "_id", "questionId"], "");
	let options = match fields.get("options") {
		None => Vec::new(),
		Some(value) => match parse_options(value) {
			Ok(options) => options,
			Err(detail) => {
				warn!(question = %id, %detail, "options field unparsable");
				issues.push(NormalizeIssue::OptionsParse {
					question_id: id.clone(),
					detail,
				});
				Vec::new()
			}
		},
	};

	Some(QuestionRecord {
		is_deleted: is_soft_deleted(fields),
		question_text: text_field(fields, &["question", "questionText", "content"], ""),
		kind: text_field(fields, &["type", "questionType"], "choice"),
		options,
		answer: text_field(fields, &["answer", "correctAnswer"], ""),
		explanation: text_field(fields, &["explanation"], ""),
		chapter_id: text_field(
			fields,
			&["chapterId", "chapterID", "chapter_id"],
			fallback_chapter_id,
		),
		difficulty: text_field(fields, &["difficulty"], "medium"),
		order: int_field(fields, &["order"], 0),
		id,
	})
}

/// Parse an options field into `{id, text}` pairs.
///
/// The field may be a JSON-encoded string, an array, or an object whose
/// values are taken as the array. String elements get letter ids (`A`,
/// `B`, ...); object elements keep their `id` (falling back to `value`,
/// then to the letter), with text from `text`/`label`/`content`.
///
/// # Errors
///
/// The parse error text, when the field is a string that is not valid JSON.
pub fn parse_options(value: &Value) -> Result<Vec<QuestionOption>, String> {
	let elements: Vec<Value> = match value {
		Value::Null => Vec::new(),
		Value::String(encoded) => {
			let parsed: Value =
				serde_json::from_str(encoded).map_err(|err| err.to_string())?;
			return parse_options(&parsed);
		}
		Value::Array(items) => items.clone(),
		Value::Object(map) => map.values().cloned().collect(),
		other => vec![other.clone()],
	};

	Ok(elements
		.iter()
		.enumerate()
		.map(|(index, element)| normalize_option(index, element))
		.collect())
}

fn normalize_option(index: usize, element: &Value) -> QuestionOption {
	match element {
		Value::Object(fields) => {
			let id = fields
				.get("id")
				.or_else(|| fields.get("value"))
				.map(value_to_string)
				.filter(|id| !id.is_empty())
				.unwrap_or_else(|| letter_for(index));
			QuestionOption {
				id,
				text: text_field(fields, &["text", "label", "content"], ""),
			}
		}
		other => QuestionOption {
			id: letter_for(index),
			text: value_to_string(other),
		},
	}
}

/// Letter id for an option position: `A`, `B`, ... wrapping after `Z`.
fn letter_for(index: usize) -> String {
	char::from(b'A' + (index % 26) as u8).to_string()
}

/// First present alias, rendered as text; `default` when all are absent.
fn text_field(fields: &Map<String, Value>, aliases: &[&str], default: &str) -> String {
	aliases
		.iter()
		.find_map(|alias| fields.get(*alias))
		.filter(|value| !value.is_null())
		.map(value_to_string)
		.unwrap_or_else(|| default.to_owned())
}

fn int_field(fields: &Map<String, Value>, aliases: &[&str], default: i64) -> i64 {
	aliases
		.iter()
		.find_map(|alias| fields.get(*alias))
		.and_then(|value| match value {
			Value::Number(n) => n.as_i64(),
			Value::String(s) => s.parse().ok(),
			_ => None,
		})
		.unwrap_or(default)
}

fn value_to_string(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Null => String::new(),
		Value::Number(n) => n.to_string(),
		Value::Bool(b) => b.to_string(),
		// Structured values keep their JSON text form.
		other => other.to_string(),
	}
}

/// Soft-delete markers: `isDeleted == 1`, `is_deleted == 1`,
/// `deleted == true` or `deleted == 1`.
fn is_soft_deleted(fields: &Map<String, Value>) -> bool {
	let flag_is_one = |name: &str| {
		fields
			.get(name)
			.and_then(Value::as_i64)
			.is_some_and(|flag| flag == 1)
	};
	flag_is_one("isDeleted")
		|| flag_is_one("is_deleted")
		|| flag_is_one("deleted")
		|| fields.get("deleted").and_then(Value::as_bool) == Some(true)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn raw_question(id: &str, order: i64) -> Value {
		json!({
			"id": id,
			"question": format!("Question {id}"),
			"type": "choice",
			"options": ["yes", "no"],
			"answer": "A",
			"chapterId": "c1",
			"order": order,
		})
	}

	#[test]
	fn all_container_shapes_normalize_identically() {
		let records = json!([raw_question("q1", 0), raw_question("q2", 1)]);
		let by_id = json!({
			"data": {
				"q1": raw_question("q1", 0),
				"q2": raw_question("q2", 1),
			}
		});
		let shapes = [
			records.clone(),
			json!({"code": 200, "data": records.clone()}),
			json!({"questions": records.clone()}),
			json!({"data": {"questions": records.clone()}}),
			by_id,
		];

		let baseline = normalize(&shapes[0], "c1");
		assert_eq!(baseline.questions.len(), 2);
		assert!(baseline.issues.is_empty());
		for shape in &shapes[1..] {
			assert_eq!(normalize(shape, "c1"), baseline);
		}
	}

	#[test]
	fn unrecognized_shape_is_reported_not_thrown() {
		let normalized = normalize(&json!("not a payload"), "c1");
		assert!(normalized.questions.is_empty());
		assert_eq!(normalized.issues, vec![NormalizeIssue::ShapeUnrecognized]);

		let no_list = normalize(&json!({"code": 500, "message": "boom"}), "c1");
		assert_eq!(no_list.issues, vec![NormalizeIssue::ShapeUnrecognized]);
	}

	#[test]
	fn field_aliases_and_defaults() {
		let normalized = normalize(
			&json!([{
				"_id": 42,
				"content": "别名问题",
				"correctAnswer": "B",
			}]),
			"c9",
		);
		let record = &normalized.questions[0];
		assert_eq!(record.id, "42");
		assert_eq!(record.question_text, "别名问题");
		assert_eq!(record.kind, "choice");
		assert_eq!(record.answer, "B");
		assert_eq!(record.explanation, "");
		assert_eq!(record.chapter_id, "c9");
		assert_eq!(record.difficulty, "medium");
		assert_eq!(record.order, 0);
	}

	#[test]
	fn soft_deleted_records_are_dropped() {
		let normalized = normalize(
			&json!([
				{"id": "keep", "question": "a", "deleted": false},
				{"id": "gone-snake", "question": "b", "is_deleted": 1},
				{"id": "gone-camel", "question": "c", "isDeleted": 1},
				{"id": "gone-bool", "question": "d", "deleted": true},
				{"id": "gone-num", "question": "e", "deleted": 1},
			]),
			"c1",
		);
		let ids: Vec<&str> = normalized.questions.iter().map(|q| q.id.as_str()).collect();
		assert_eq!(ids, vec!["keep"]);
	}

	#[test]
	fn records_sort_by_order_with_stable_ties() {
		let normalized = normalize(
			&json!([
				{"id": "late", "order": 2},
				{"id": "tie-a", "order": 0},
				{"id": "mid", "order": 1},
				{"id": "tie-b", "order": 0},
			]),
			"c1",
		);
		let ids: Vec<&str> = normalized.questions.iter().map(|q| q.id.as_str()).collect();
		assert_eq!(ids, vec!["tie-a", "tie-b", "mid", "late"]);
	}

	#[test]
	fn options_from_json_encoded_string() {
		let options = parse_options(&json!(r#"["A选项","B选项"]"#)).unwrap();
		assert_eq!(
			options,
			vec![
				QuestionOption {
					id: "A".to_owned(),
					text: "A选项".to_owned(),
				},
				QuestionOption {
					id: "B".to_owned(),
					text: "B选项".to_owned(),
				},
			]
		);
	}

	#[test]
	fn options_from_objects_keep_their_ids() {
		let options = parse_options(&json!([{"value": "X", "label": "Opt"}])).unwrap();
		assert_eq!(
			options,
			vec![QuestionOption {
				id: "X".to_owned(),
				text: "Opt".to_owned(),
			}]
		);
	}

	#[test]
	fn null_options_are_empty() {
		assert_eq!(parse_options(&Value::Null).unwrap(), Vec::new());
	}

	#[test]
	fn object_options_take_values() {
		let options = parse_options(&json!({"A": "first", "B": "second"})).unwrap();
		assert_eq!(options.len(), 2);
		assert_eq!(options[0].text, "first");
		assert_eq!(options[1].text, "second");
	}

	#[test]
	fn unparsable_options_string_is_reported() {
		let normalized = normalize(
			&json!([{"id": "q1", "question": "a", "options": "not json"}]),
			"c1",
		);
		assert_eq!(normalized.questions[0].options, Vec::new());
		assert!(matches!(
			&normalized.issues[0],
			NormalizeIssue::OptionsParse { question_id, .. } if question_id == "q1"
		));
	}
}
