//! Thin client for the Google Generative Language REST API. Both the
//! embedding and generation services go through here so every external call
//! shares one timeout policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Embedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<Embedding>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_base: &str, api_key: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Embed a batch of texts with one round trip. Output order matches
    /// input order.
    pub async fn embed_batch(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, String> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/{}:batchEmbedContents?key={}",
            self.api_base, model, self.api_key
        );
        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: model.to_string(),
                    content: Content {
                        role: None,
                        parts: vec![Part { text: text.clone() }],
                    },
                })
                .collect(),
        };

        let response = self
            .client
            .post(&url)
            .header("User-Agent", "wren/0.2")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Failed to send embedding request: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Embedding request failed with status: {}",
                response.status()
            ));
        }

        let parsed: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse embedding response: {}", e))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(format!(
                "Embedding response has {} vectors for {} inputs",
                parsed.embeddings.len(),
                texts.len()
            ));
        }

        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    pub async fn embed_single(&self, model: &str, text: &str) -> Result<Vec<f32>, String> {
        let url = format!("{}/{}:embedContent?key={}", self.api_base, model, self.api_key);
        let body = EmbedRequest {
            model: model.to_string(),
            content: Content {
                role: None,
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(&url)
            .header("User-Agent", "wren/0.2")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Failed to send embedding request: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Embedding request failed with status: {}",
                response.status()
            ));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse embedding response: {}", e))?;

        Ok(parsed.embedding.values)
    }

    /// Call generateContent. Returns `Ok(None)` when the call succeeds but
    /// carries no usable text; the caller decides what that means.
    pub async fn generate(
        &self,
        model: &str,
        system_instruction: Option<&str>,
        user_text: &str,
        temperature: f32,
    ) -> Result<Option<String>, String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, model, self.api_key
        );
        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: user_text.to_string(),
                }],
            }],
            system_instruction: system_instruction.map(|text| Content {
                role: None,
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }),
            generation_config: GenerationConfig { temperature },
        };

        let response = self
            .client
            .post(&url)
            .header("User-Agent", "wren/0.2")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Failed to send generation request: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Generation request failed with status: {}",
                response.status()
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse generation response: {}", e))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.is_empty());

        Ok(text)
    }
}
