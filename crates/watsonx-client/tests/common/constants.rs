//! Shared test data

/// Text generation endpoint
pub const GENERATION_PATH: &str = "/ml/v1/text/generation";

/// Model listing endpoint
pub const MODELS_PATH: &str = "/ml/v1/foundation_model_specs";

/// A generation request body
pub const GENERATION_PAYLOAD: &str =
    r#"{"model_id":"ibm/granite-13b-chat-v2","input":"Hello","parameters":{"max_new_tokens":20}}"#;

/// A successful generation response body
pub const GENERATION_RESULT: &str =
    r#"{"results":[{"generated_text":"Hi there","stop_reason":"eos_token"}]}"#;

/// The documented watsonx error envelope
pub const ERROR_ENVELOPE: &str = r#"{"errors":[{"code":"invalid_request","message":"Invalid input parameter","more_info":"Check request payload"}],"trace":"trace-id-123"}"#;
