use serde::Serialize;
use wasm_bindgen::prelude::*;

use score_engine::{Dialect, EngineConfig, ParsedScore, ScoreError};

#[derive(Serialize)]
struct BindingError {
    message: String,
    kind: &'static str,
}

impl From<ScoreError> for BindingError {
    fn from(e: ScoreError) -> Self {
        let kind = match e {
            ScoreError::Io { .. } => "io",
            ScoreError::Config(_) => "config",
            ScoreError::UnknownDialect(_) => "dialect",
            ScoreError::Serialize(_) => "serialize",
        };
        Self {
            message: e.to_string(),
            kind,
        }
    }
}

fn to_js_error(e: ScoreError) -> JsValue {
    let error = BindingError::from(e);
    match serde_json::to_string(&error) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&error.message),
    }
}

fn parse(content: &str, dialect: &str, config_yaml: Option<String>) -> Result<ParsedScore, ScoreError> {
    let config = match config_yaml {
        Some(yaml) => EngineConfig::from_yaml(&yaml)?,
        None => EngineConfig::default(),
    };
    let score = match Dialect::from_name(dialect)? {
        Some(dialect) => score_engine::parse_score_as(content, dialect, &config),
        None => score_engine::parse_score_with(content, &config),
    };
    Ok(score)
}

/// Parse a score and return it as JSON (camelCase fields)
#[wasm_bindgen]
pub fn parse_score(content: &str) -> Result<String, JsValue> {
    score_engine::parse_score(content).to_json().map_err(to_js_error)
}

/// Parse with a forced dialect (`auto`, `abc`, `legacy`) and an optional YAML engine config
#[wasm_bindgen]
pub fn parse_score_with(content: &str, dialect: &str, config_yaml: Option<String>) -> Result<String, JsValue> {
    parse(content, dialect, config_yaml)
        .and_then(|score| score.to_json())
        .map_err(to_js_error)
}

/// Parse a score straight into a JS object
#[wasm_bindgen]
pub fn parse_score_value(content: &str) -> Result<JsValue, JsValue> {
    let score = score_engine::parse_score(content);
    serde_wasm_bindgen::to_value(&score).map_err(|e| to_js_error(ScoreError::Serialize(e.to_string())))
}

/// `"abc"` or `"legacy"`
#[wasm_bindgen]
pub fn detect_dialect(content: &str) -> String {
    score_engine::detect_dialect(content).name().to_string()
}

/// Frequency in Hz of a pitch class (0-11) in an octave
#[wasm_bindgen]
pub fn note_frequency(pitch: u8, octave: i32) -> f64 {
    score_engine::get_frequency(pitch, octave)
}

/// Milliseconds per step at a tempo
#[wasm_bindgen]
pub fn step_duration_ms(bpm: u32) -> f64 {
    score_engine::step_duration_ms(bpm)
}

/// Names of the embedded demo scores as a JSON array
#[wasm_bindgen]
pub fn list_scores() -> String {
    serde_json::to_string(&score_library::list_scores()).unwrap_or_else(|_| "[]".to_string())
}

/// Content of an embedded demo score
#[wasm_bindgen]
pub fn get_score(name: &str) -> Option<String> {
    score_library::get_score(name).map(|score| score.content)
}
