//! Discovery-to-records flows through the public client surface.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::{Value, json};

use lectern_quiz::{
	FetchError, FetchResponse, FetchState, Fetcher, QuizClient, QuizClientConfig,
};

/// Fetcher that scripts one response per URL and records every call.
struct Backend {
	responses: HashMap<String, FetchResponse>,
	calls: Mutex<Vec<String>>,
}

impl Backend {
	fn new(routes: &[(&str, u16, Value)]) -> Self {
		Self {
			responses: routes
				.iter()
				.map(|(url, status, body)| {
					((*url).to_owned(), FetchResponse {
						status: *status,
						body: body.clone(),
					})
				})
				.collect(),
			calls: Mutex::new(Vec::new()),
		}
	}
}

impl Fetcher for Backend {
	async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
		self.calls.lock().push(url.to_owned());
		Ok(self.responses.get(url).cloned().unwrap_or(FetchResponse {
			status: 404,
			body: Value::Null,
		}))
	}
}

#[tokio::test]
async fn legacy_backend_is_discovered_and_normalized() {
	// Only the oldest route shape exists, and it wraps its records the old
	// way: a data map keyed by id, with soft-deleted leftovers.
	let backend = Backend::new(&[(
		"/api/quiz/question/chapter/12",
		200,
		json!({
			"code": 200,
			"data": {
				"q2": {
					"questionId": "q2",
					"content": "第二题",
					"options": r#"["对","错"]"#,
					"correctAnswer": "A",
					"order": 2,
				},
				"q1": {
					"questionId": "q1",
					"content": "第一题",
					"options": [{"value": "X", "label": "Opt"}],
					"order": 1,
				},
				"zombie": {
					"questionId": "zombie",
					"content": "deleted",
					"is_deleted": 1,
				},
			},
		}),
	)]);
	let client = QuizClient::with_fetcher(backend, QuizClientConfig::default());

	let result = client.chapter_questions("12").await;
	assert_eq!(
		result.state,
		FetchState::Loaded {
			endpoint: "/api/quiz/question/chapter/12".to_owned(),
		}
	);
	assert!(result.issues.is_empty());

	let ids: Vec<&str> = result.questions.iter().map(|q| q.id.as_str()).collect();
	assert_eq!(ids, vec!["q1", "q2"]);
	assert_eq!(result.questions[0].options[0].id, "X");
	assert_eq!(result.questions[0].options[0].text, "Opt");
	assert_eq!(result.questions[1].options[0].text, "对");
	assert_eq!(result.questions[1].chapter_id, "12");
}

#[tokio::test]
async fn dead_backend_yields_an_explicit_unavailable_state() {
	let backend = Backend::new(&[]);
	let client = QuizClient::with_fetcher(backend, QuizClientConfig::default());

	let result = client.chapter_questions("12").await;
	assert!(result.questions.is_empty());
	assert_eq!(result.state, FetchState::Unavailable);
}
