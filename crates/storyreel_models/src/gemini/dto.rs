//! Gemini `generateContent` data transfer objects.

use serde::{Deserialize, Serialize};
use storyreel_core::{GenerateRequest, GenerateResponse, Role};
use storyreel_error::{TextGenError, TextGenErrorKind};

/// One content block: a role and its text parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeminiContent {
    /// `user` or `model`; absent on system instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text parts
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A text part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeminiPart {
    /// Part text
    #[serde(default)]
    pub text: String,
}

/// Sampling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    /// Output token cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Request body of `models/{model}:generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    /// Conversation turns
    pub contents: Vec<GeminiContent>,
    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    /// Sampling options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeminiResponse {
    /// Candidate completions
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// A candidate completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeminiCandidate {
    /// Candidate content
    #[serde(default)]
    pub content: Option<GeminiContent>,
}

fn text_content(role: Option<&str>, text: &str) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart {
            text: text.to_string(),
        }],
    }
}

impl From<&GenerateRequest> for GeminiRequest {
    fn from(req: &GenerateRequest) -> Self {
        let mut system = Vec::new();
        let mut contents = Vec::new();
        for message in &req.messages {
            match message.role {
                Role::System => system.push(message.content.as_str()),
                Role::User => contents.push(text_content(Some("user"), &message.content)),
                Role::Assistant => contents.push(text_content(Some("model"), &message.content)),
            }
        }

        let generation_config = if req.max_tokens.is_some() || req.temperature.is_some() {
            Some(GenerationConfig {
                max_output_tokens: req.max_tokens,
                temperature: req.temperature,
            })
        } else {
            None
        };

        Self {
            contents,
            system_instruction: (!system.is_empty())
                .then(|| text_content(None, &system.join("\n\n"))),
            generation_config,
        }
    }
}

impl TryFrom<GeminiResponse> for GenerateResponse {
    type Error = TextGenError;

    fn try_from(response: GeminiResponse) -> Result<Self, Self::Error> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(TextGenError::new(TextGenErrorKind::EmptyResponse));
        }
        Ok(GenerateResponse::new(text.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_core::Message;

    #[test]
    fn maps_roles_and_system_instruction() {
        let req = GenerateRequest {
            messages: vec![
                Message {
                    role: Role::System,
                    content: "Be brief".to_string(),
                },
                Message::user("Hi"),
                Message::assistant("Hello"),
                Message::user("Story?"),
            ],
            max_tokens: Some(100),
            ..GenerateRequest::default()
        };
        let body = GeminiRequest::from(&req);

        assert_eq!(body.contents.len(), 3);
        assert_eq!(body.contents[1].role.as_deref(), Some("model"));
        assert_eq!(
            body.system_instruction.as_ref().map(|c| c.parts[0].text.as_str()),
            Some("Be brief")
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
        assert!(json["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn empty_candidates_are_an_error() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(GenerateResponse::try_from(response).is_err());

        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": " A tale. "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(GenerateResponse::try_from(response).unwrap().text, "A tale.");
    }
}
