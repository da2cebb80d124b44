use super::scheduler::{ThreatClassifier, Verdict};
use crate::error::ClassifyError;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

const SYSTEM_PROMPT: &str = "You classify bike security audio transcripts. \
Respond ONLY with JSON like {\"alert\":true|false,\"reason\":\"short explanation\"}. \
Flag potential theft, tampering, break-in, or distress.";

/// Transcript classifier backed by a Gemini-style generateContent API.
pub struct GeminiClassifier {
    http: reqwest::Client,
    endpoint_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClassifier {
    pub fn new(
        http: reqwest::Client,
        endpoint_base: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoint_base: endpoint_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        }
    }
}

/// Pull a JSON object out of model output that may wrap it in prose or
/// code fences: try a direct parse first, then the outermost `{...}` span.
fn extract_json(content: &str) -> Option<Value> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Some(value);
    }
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&content[start..=end]).ok()
}

#[async_trait::async_trait]
impl ThreatClassifier for GeminiClassifier {
    async fn classify(
        &self,
        transcript: &str,
        cancel: &CancellationToken,
    ) -> Result<Verdict, ClassifyError> {
        let text = transcript.trim();
        if text.is_empty() {
            return Ok(Verdict {
                alert: false,
                reason: String::new(),
            });
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ClassifyError::Unconfigured("missing API key for transcript analysis".to_string())
        })?;

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.endpoint_base, self.model, api_key
        );
        let body = json!({
            "system_instruction": {
                "role": "system",
                "parts": [{ "text": SYSTEM_PROMPT }],
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": format!("Transcript to classify:\n\"\"\"{text}\"\"\"") }],
            }],
            "generationConfig": { "temperature": 0.1 },
        });

        let request = self.http.post(&url).json(&body).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ClassifyError::Cancelled),
            response = request => response.map_err(|e| ClassifyError::Service(e.to_string()))?,
        };

        let status = response.status();
        let data: Value = tokio::select! {
            _ = cancel.cancelled() => return Err(ClassifyError::Cancelled),
            data = response.json() => data.map_err(|e| ClassifyError::Service(e.to_string()))?,
        };

        if !status.is_success() {
            let message = data
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("transcript analysis failed")
                .to_string();
            return Err(ClassifyError::Service(message));
        }

        let combined: String = data
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        let parsed = extract_json(&combined).ok_or_else(|| {
            ClassifyError::Malformed("no JSON verdict in classifier output".to_string())
        })?;

        Ok(Verdict {
            alert: parsed.get("alert").and_then(Value::as_bool).unwrap_or(false),
            reason: parsed
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::extract_json;

    #[test]
    fn extract_json_parses_direct_object() {
        let value = extract_json(r#"{"alert":true,"reason":"tampering"}"#).unwrap();
        assert_eq!(value["alert"], true);
        assert_eq!(value["reason"], "tampering");
    }

    #[test]
    fn extract_json_recovers_object_from_fenced_output() {
        let value =
            extract_json("```json\n{\"alert\":false,\"reason\":\"\"}\n```").unwrap();
        assert_eq!(value["alert"], false);
    }

    #[test]
    fn extract_json_rejects_garbage() {
        assert!(extract_json("no verdict here").is_none());
        assert!(extract_json("").is_none());
        assert!(extract_json("} backwards {").is_none());
    }
}
