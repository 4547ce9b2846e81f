#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::pin::Pin;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::stream::TryStreamExt;
use futures::Stream;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::io::Lines;
use tokio_util::io::StreamReader;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::FragmentStream;
use crate::domain::models::Part;
use crate::domain::models::Turn;

type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;
type LineReader = Lines<StreamReader<ByteStream, Bytes>>;

/// The credential travels in this header so it never shows up in request
/// URLs, and therefore never in error messages or logs.
const API_KEY_HEADER: &str = "x-goog-api-key";

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.without_url().to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentPartsBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ContentParts {
    Text(String),
    InlineData(ContentPartsBlob),
}

impl From<&Part> for ContentParts {
    fn from(part: &Part) -> ContentParts {
        return match part {
            Part::Image(image) => ContentParts::InlineData(ContentPartsBlob {
                mime_type: image.mime_type.to_string(),
                data: image.data.to_string(),
            }),
            Part::Text(text) => ContentParts::Text(text.to_string()),
        };
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<ContentParts>,
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Content {
        return Content {
            role: turn.role.as_api_str().to_string(),
            parts: turn.parts.iter().map(ContentParts::from).collect(),
        };
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SystemInstruction {
    parts: Vec<ContentParts>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct ResponseError {
    #[serde(default)]
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ResponseError>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        return self
            .candidates
            .first()
            .and_then(|candidate| return candidate.content.as_ref())
            .map(|content| {
                return content
                    .parts
                    .iter()
                    .filter_map(|part| return part.text.as_deref())
                    .collect::<String>();
            })
            .unwrap_or_default();
    }
}

/// Connection settings for the Gemini API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeminiSettings {
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: String,
    pub system_instruction: String,
}

impl GeminiSettings {
    pub fn from_config() -> GeminiSettings {
        return GeminiSettings {
            url: Config::get(ConfigKey::ApiURL),
            api_key: Config::get(ConfigKey::ApiKey),
            model: Config::get(ConfigKey::Model),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
            system_instruction: Config::get(ConfigKey::SystemInstruction),
        };
    }

    fn model_url(&self) -> String {
        return format!(
            "{url}/v1beta/models/{model}",
            url = self.url.trim_end_matches('/'),
            model = self.model.trim_start_matches("models/")
        );
    }

    fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.api_key.is_empty() {
            bail!("Gemini API key is not defined");
        }
        if self.model.is_empty() {
            bail!("Gemini model is not defined");
        }

        return Ok(());
    }
}

enum StreamState {
    Pending(GeminiSettings, BackendPrompt),
    Reading(LineReader),
    Done,
}

/// Gemini backend. Settings are read from `Config` whenever a request is made
/// unless they were fixed at construction.
#[derive(Default)]
pub struct Gemini {
    settings: Option<GeminiSettings>,
}

impl Gemini {
    pub fn with_settings(settings: GeminiSettings) -> Gemini {
        return Gemini {
            settings: Some(settings),
        };
    }

    fn settings(&self) -> GeminiSettings {
        return self
            .settings
            .clone()
            .unwrap_or_else(GeminiSettings::from_config);
    }
}

fn completion_request(settings: &GeminiSettings, prompt: &BackendPrompt) -> CompletionRequest {
    let mut system_instruction = None;
    if !settings.system_instruction.trim().is_empty() {
        system_instruction = Some(SystemInstruction {
            parts: vec![ContentParts::Text(
                settings.system_instruction.trim().to_string(),
            )],
        });
    }

    return CompletionRequest {
        contents: prompt.turns().iter().map(Content::from).collect(),
        system_instruction,
    };
}

async fn open_stream(settings: &GeminiSettings, prompt: &BackendPrompt) -> Result<LineReader> {
    settings.validate()?;

    let req = completion_request(settings, prompt);
    tracing::debug!(
        model = %settings.model,
        turns = req.contents.len(),
        "sending Gemini completion request"
    );

    let res = reqwest::Client::new()
        .post(format!(
            "{model_url}:streamGenerateContent?alt=sse",
            model_url = settings.model_url(),
        ))
        .header(API_KEY_HEADER, &settings.api_key)
        .json(&req)
        .send()
        .await
        .map_err(|err| return err.without_url())?;

    if !res.status().is_success() {
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        tracing::error!(status, body = %body, "Failed to make completion request to Gemini");
        bail!(format!(
            "Failed to make completion request to Gemini, {status}"
        ));
    }

    let stream: ByteStream = Box::pin(res.bytes_stream().map_err(convert_err));
    return Ok(StreamReader::new(stream).lines());
}

/// Extracts the text carried by one server-sent event line. Lines without
/// text yield `None`.
fn parse_event_line(line: &str) -> Result<Option<String>> {
    let Some(payload) = line.trim().strip_prefix("data:") else {
        return Ok(None);
    };
    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(None);
    }

    let res: GenerateContentResponse = serde_json::from_str(payload)?;
    if let Some(err) = res.error {
        bail!(format!("Gemini returned an error, {}", err.message));
    }

    let text = res.text();
    if text.is_empty() {
        return Ok(None);
    }

    return Ok(Some(text));
}

async fn next_fragment(state: StreamState) -> Option<(Result<String>, StreamState)> {
    let mut lines = match state {
        StreamState::Done => return None,
        StreamState::Reading(lines) => lines,
        StreamState::Pending(settings, prompt) => match open_stream(&settings, &prompt).await {
            Ok(lines) => lines,
            Err(err) => return Some((Err(err), StreamState::Done)),
        },
    };

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_event_line(&line) {
                Ok(Some(text)) => return Some((Ok(text), StreamState::Reading(lines))),
                Ok(None) => continue,
                Err(err) => {
                    tracing::error!(error = ?err, line = %line, "Failed to parse Gemini response");
                    return Some((Err(err), StreamState::Done));
                }
            },
            Ok(None) => return None,
            Err(err) => return Some((Err(err.into()), StreamState::Done)),
        }
    }
}

#[async_trait]
impl Backend for Gemini {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let settings = self.settings();
        settings.validate()?;

        let res = reqwest::Client::new()
            .get(settings.model_url())
            .header(API_KEY_HEADER, &settings.api_key)
            .timeout(Duration::from_millis(settings.timeout.parse::<u64>()?))
            .send()
            .await
            .map_err(|err| return err.without_url());

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Gemini is not reachable");
                bail!("Gemini is not reachable");
            }
        };

        let status = res.status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!("Gemini health check failed");
        }

        return Ok(());
    }

    fn stream(&self, prompt: BackendPrompt) -> FragmentStream {
        let state = StreamState::Pending(self.settings(), prompt);
        return Box::pin(stream::unfold(state, |state| {
            return next_fragment(state);
        }));
    }
}
