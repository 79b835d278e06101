//! Payload Builder: persona + caller text -> OpenAI-compatible chat request.
//!
//! One system message (Samurai Master framing, stance directive, rigid JSON
//! output contract) and one user message carrying the caller's text verbatim.
//! No sanitization, no truncation: the upstream model owns safety filtering.
//! Generation parameters are fixed constants, never computed.

use serde::Serialize;

use crate::stance::Persona;

/// Model identifier sent with every request unless overridden by config.
pub const DEFAULT_MODEL: &str = "Phi-4";

/// Fixed sampling temperature for the rewrite.
pub const FORGE_TEMPERATURE: f32 = 0.7;

/// Chat message in the OpenAI-compatible wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// `response_format` block requesting a raw JSON object from the model.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Request body for the chat-completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

/// Build the two-message exchange for the given persona and caller text.
pub fn build_chat_request(persona: &Persona, user_text: &str, model: &str) -> ChatRequest {
    let system = format!(
        "You are a Samurai Master. Rewrite the input text. \
         Instruction: {}. \
         Respond ONLY with a JSON object: \
         {{ \"refined_text\": \"string\", \"honor\": int, \"stealth\": int }}",
        persona.directive
    );

    ChatRequest {
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: user_text.to_string(),
            },
        ],
        model: model.to_string(),
        temperature: FORGE_TEMPERATURE,
        response_format: ResponseFormat {
            format_type: "json_object".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stance;

    #[test]
    fn test_build_embeds_directive_and_contract() {
        let persona = stance::resolve("short");
        let req = build_chat_request(persona, "fix the server", DEFAULT_MODEL);

        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert!(req.messages[0].content.contains("STANCE: NINJA."));
        assert!(req.messages[0].content.contains("\"refined_text\""));
        assert_eq!(req.messages[1].role, "user");
        assert_eq!(req.messages[1].content, "fix the server");
    }

    #[test]
    fn test_user_text_passes_verbatim() {
        let persona = stance::resolve("vibe");
        let text = "  WHY is the {report} STILL \"late\"??\n\n-- me  ";
        let req = build_chat_request(persona, text, DEFAULT_MODEL);
        assert_eq!(req.messages[1].content, text);
    }

    #[test]
    fn test_wire_shape() {
        let persona = stance::resolve("professional");
        let req = build_chat_request(persona, "hello", "Phi-4");
        let wire = serde_json::to_value(&req).unwrap();

        assert_eq!(wire["model"], "Phi-4");
        assert_eq!(wire["response_format"]["type"], "json_object");
        let temp = wire["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 1e-6);
        assert_eq!(wire["messages"][1]["content"], "hello");
    }
}
