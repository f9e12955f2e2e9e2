use formsmith::adapters::sample_forms::SampleForm;
use formsmith::domain::{ActionType, AnalysisCategory, EventType};
use formsmith::generator::{
    EventGeneratorService, EventOutcome, GenerationError, GenerationRequest, GenerationSettings,
};
use formsmith::llm::{ChatCompletionsProvider, LlmConfig, LlmError};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers each request with the next scripted completion
struct Script {
    replies: Vec<&'static str>,
    calls: std::sync::atomic::AtomicUsize,
}

impl Respond for Script {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let content = self.replies.get(index).copied().unwrap_or("");
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }))
    }
}

fn service_for(server: &MockServer, settings: GenerationSettings) -> EventGeneratorService {
    let config = LlmConfig {
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        model: "test-model".to_string(),
        ..Default::default()
    };
    let provider =
        ChatCompletionsProvider::with_api_key(&config, SecretString::from("sk-test-key".to_string()))
            .unwrap();
    EventGeneratorService::new(Arc::new(provider), settings).unwrap()
}

#[tokio::test]
async fn test_generate_against_chat_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test-key"))
        .and(body_partial_json(json!({ "model": "test-model", "max_tokens": 2000 })))
        .respond_with(Script {
            replies: vec![
                r#"Here is the analysis:
```json
{"eventAnalysis":{"eventType":"change","action":"fill the price","targetField":"price","sourceField":"productId","description":"fill price"}}
```"#,
                r#"{"type":"change","actions":[{"type":"setValue","targetField":"price","sourceExpression":"selectedOption.price"}]}"#,
            ],
            calls: Default::default(),
        })
        .expect(2)
        .mount(&server)
        .await;

    let service = service_for(&server, GenerationSettings::default());
    let form = SampleForm::Product.load().unwrap();
    let request = GenerationRequest::for_form(
        &form,
        &["productId".to_string()],
        "when a product is picked, fill in its price",
    )
    .unwrap()
    .with_categories(vec![AnalysisCategory::Event]);

    let fragments = service.generate(&request).await.unwrap();
    let event = fragments.event.unwrap();
    assert_eq!(event.target_field, "price");
    let EventOutcome::Generated(generated) = event.outcome else {
        panic!("event should pass validation");
    };
    assert_eq!(generated.event_type, EventType::Change);
    assert_eq!(generated.actions[0].action_type, ActionType::SetValue);
    assert!(fragments.validation.is_none());

    // Every request is a single user message
    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "user");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("when a product is picked, fill in its price"));
}

#[tokio::test]
async fn test_api_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let service = service_for(&server, GenerationSettings::default());
    let form = SampleForm::User.load().unwrap();
    let request = GenerationRequest::for_form(
        &form,
        &[form.fields[0].field_name.clone()],
        "check the email when leaving the field",
    )
    .unwrap();
    let err = service.generate_event_direct(&request).await.unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Llm(LlmError::Api { status: 429, .. })
    ));
}

#[tokio::test]
async fn test_malformed_completion_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(Script {
            replies: vec!["I could not work out what you meant."],
            calls: Default::default(),
        })
        .mount(&server)
        .await;

    let service = service_for(&server, GenerationSettings::default());
    let form = SampleForm::Order.load().unwrap();
    let err = service
        .analyze_intent("copy the phone number", &form.fields)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}
