//! Conversion options
//!
//! Clients send tuning parameters as a JSON-encoded string in the `options` form field.
//! The bag is deliberately lenient: unknown keys are kept (and echoed back) but ignored,
//! numbers may arrive as numeric strings, and a value that cannot be parsed never fails
//! the request. It falls back to the documented default instead.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

pub const DEFAULT_QUALITY: u8 = 80;
pub const DEFAULT_BITRATE: &str = "128k";
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u8 = 2;

/// The `options` field could not be used; the conversion proceeds with defaults.
#[derive(Debug, thiserror::Error)]
pub enum OptionsParseWarning {
    #[error("options is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("options must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Loosely typed mapping of caller-supplied tuning parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsBag {
    values: Map<String, Value>,
}

/// Image options with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    pub quality: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub maintain_aspect_ratio: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }
}

/// Audio options with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioOptions {
    pub bitrate: String,
    pub sample_rate: u32,
    pub channels: u8,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            bitrate: DEFAULT_BITRATE.to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

impl OptionsBag {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Parse the raw form field. Empty input yields an empty bag.
    pub fn try_parse(raw: &str) -> Result<Self, OptionsParseWarning> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            Value::Array(_) => Err(OptionsParseWarning::NotAnObject("array")),
            Value::String(_) => Err(OptionsParseWarning::NotAnObject("string")),
            Value::Number(_) => Err(OptionsParseWarning::NotAnObject("number")),
            Value::Bool(_) => Err(OptionsParseWarning::NotAnObject("boolean")),
        }
    }

    /// Parse the form field, degrading to an empty bag (all defaults) with a warning.
    pub fn from_form_field(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        Self::try_parse(raw).unwrap_or_else(|warning| {
            tracing::warn!(warning = %warning, "Failed to parse conversion options, using defaults");
            Self::default()
        })
    }

    /// Raw key/value pairs as sent by the client.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn image_options(&self) -> ImageOptions {
        let defaults = ImageOptions::default();
        let quality = match self.get_u64("quality") {
            Some(0) | None => defaults.quality,
            Some(q) => q.min(100) as u8,
        };
        ImageOptions {
            quality,
            width: self.get_dimension("width"),
            height: self.get_dimension("height"),
            maintain_aspect_ratio: self
                .get_bool("maintainAspectRatio")
                .unwrap_or(defaults.maintain_aspect_ratio),
        }
    }

    pub fn audio_options(&self) -> AudioOptions {
        let defaults = AudioOptions::default();
        let bitrate = match self.values.get("bitrate") {
            None | Some(Value::Null) => defaults.bitrate,
            Some(value) => normalize_bitrate(value).unwrap_or_else(|| {
                tracing::warn!(bitrate = %value, "Ignoring invalid bitrate option");
                defaults.bitrate
            }),
        };
        let sample_rate = self
            .get_u64("sampleRate")
            .filter(|rate| *rate > 0 && *rate <= u32::MAX as u64)
            .map(|rate| rate as u32)
            .unwrap_or(defaults.sample_rate);
        let channels = match self.get_u64("channels") {
            Some(c @ (1 | 2)) => c as u8,
            Some(other) => {
                tracing::warn!(channels = other, "Ignoring unsupported channel count");
                defaults.channels
            }
            None => defaults.channels,
        };
        AudioOptions {
            bitrate,
            sample_rate,
            channels,
        }
    }

    fn get_dimension(&self, key: &str) -> Option<u32> {
        self.get_u64(key)
            .filter(|v| *v > 0 && *v <= u32::MAX as u64)
            .map(|v| v as u32)
    }

    fn get_u64(&self, key: &str) -> Option<u64> {
        match self.values.get(key)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f.round() as u64)
                })
            }
            _ => None,
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_u64().map(|v| v != 0),
            _ => None,
        }
    }
}

/// Accept `"192k"`, `"192K"`, `"1M"`, `"192000"` or a bare number of kbit/s.
fn normalize_bitrate(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().filter(|v| *v > 0).map(|v| format!("{}k", v)),
        Value::String(s) => {
            let s = s.trim();
            let (digits, suffix) = match s.char_indices().last()? {
                (idx, c) if c.is_ascii_alphabetic() => (&s[..idx], Some(c.to_ascii_lowercase())),
                _ => (s, None),
            };
            let amount: u64 = digits.parse().ok().filter(|v| *v > 0)?;
            match suffix {
                None => Some(amount.to_string()),
                Some('k') => Some(format!("{}k", amount)),
                Some('m') => Some(format!("{}M", amount)),
                Some(_) => None,
            }
        }
        _ => None,
    }
}
