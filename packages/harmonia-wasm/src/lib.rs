use harmonia::advisor::{Advice, AdviceRequest};
use harmonia::circle::slots;
use harmonia::key_signature::{signature_for, AccidentalPlacement, Key, KeySignature};
use harmonia::keyboard::keyboard as keyboard_for;
use harmonia::staff::{StaffNote, STAFF_LINES};
use harmonia::{ChordDefinition, ChordQuality, HarmoniaError, NoteName};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct BindingError {
    kind: &'static str,
    message: String,
}

fn error_to_binding_error(e: HarmoniaError) -> BindingError {
    let kind = match e {
        HarmoniaError::UnknownNote(_) => "unknown-note",
        HarmoniaError::UnknownQuality(_) => "unknown-quality",
        HarmoniaError::UnknownKey(_) => "unknown-key",
        HarmoniaError::MidiOutOfRange { .. } => "midi-out-of-range",
        HarmoniaError::ConfigError(_) => "config",
        HarmoniaError::Io(_) => "io",
    };
    BindingError {
        kind,
        message: e.to_string(),
    }
}

fn to_js_error(e: BindingError) -> JsValue {
    let json = serde_json::to_string(&e).unwrap_or_else(|_| format!("{{\"message\":{:?}}}", e.message));
    JsValue::from_str(&json)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, BindingError> {
    serde_json::to_string(value).map_err(|e| BindingError {
        kind: "serialize",
        message: e.to_string(),
    })
}

fn chord_for(root: &str, quality: &str) -> Result<ChordDefinition, BindingError> {
    let root: NoteName = root.parse().map_err(error_to_binding_error)?;
    let quality: ChordQuality = quality.parse().map_err(error_to_binding_error)?;
    harmonia::resolve(root, quality).map_err(error_to_binding_error)
}

/// Everything a staff view draws for one chord
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StaffView {
    staff_lines: [i32; 5],
    key_signature: KeySignature,
    accidentals: Vec<AccidentalPlacement>,
    notes: Vec<StaffNote>,
}

fn chord_json(root: &str, quality: &str) -> Result<String, BindingError> {
    to_json(&chord_for(root, quality)?)
}

fn symbol_json(chord_symbol: &str) -> Result<String, BindingError> {
    let chord = harmonia::resolve_symbol(chord_symbol).map_err(error_to_binding_error)?;
    to_json(&chord)
}

fn staff_json(root: &str, quality: &str) -> Result<String, BindingError> {
    let chord = chord_for(root, quality)?;
    let key_signature = signature_for(Key::major(chord.root));
    to_json(&StaffView {
        staff_lines: STAFF_LINES,
        key_signature,
        accidentals: key_signature.placements(),
        notes: harmonia::layout_chord(&chord),
    })
}

fn key_signature_json(key: &str) -> Result<String, BindingError> {
    let key: Key = key.parse().map_err(error_to_binding_error)?;
    to_json(&signature_for(key))
}

fn keyboard_json(root: &str, quality: &str) -> Result<String, BindingError> {
    to_json(&keyboard_for(&chord_for(root, quality)?))
}

fn advice_prompt_text(root: &str, quality: &str) -> Result<String, BindingError> {
    let root: NoteName = root.parse().map_err(error_to_binding_error)?;
    let quality: ChordQuality = quality.parse().map_err(error_to_binding_error)?;
    Ok(AdviceRequest::new(root, quality).prompt())
}

fn advice_json(root: &str, reply: &str) -> Result<String, BindingError> {
    let root: NoteName = root.parse().map_err(error_to_binding_error)?;
    let advice = Advice::from_json(reply).unwrap_or_else(|_| Advice::fallback(root));
    to_json(&advice)
}

/// Resolve a chord from a root name and a quality ("minor-7", "m7", "Minor 7th")
#[wasm_bindgen]
pub fn resolve_chord(root: &str, quality: &str) -> Result<String, JsValue> {
    chord_json(root, quality).map_err(to_js_error)
}

/// Resolve a chord symbol such as "Gm7"
#[wasm_bindgen]
pub fn resolve_symbol(chord_symbol: &str) -> Result<String, JsValue> {
    symbol_json(chord_symbol).map_err(to_js_error)
}

/// Resolved chord as a JS object instead of JSON text
#[wasm_bindgen]
pub fn chord_value(root: &str, quality: &str) -> Result<JsValue, JsValue> {
    let chord = chord_for(root, quality).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&chord).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Staff lines, key signature glyphs and note positions for a chord
#[wasm_bindgen]
pub fn staff_layout(root: &str, quality: &str) -> Result<String, JsValue> {
    staff_json(root, quality).map_err(to_js_error)
}

/// Key signature of a key written as "Eb" or "F#m"
#[wasm_bindgen]
pub fn key_signature(key: &str) -> Result<String, JsValue> {
    key_signature_json(key).map_err(to_js_error)
}

/// The twelve circle-of-fifths slots
#[wasm_bindgen]
pub fn circle_slots() -> String {
    serde_json::to_string(&slots()).unwrap_or_else(|_| "[]".to_string())
}

/// The two-octave keyboard with the chord highlighted
#[wasm_bindgen]
pub fn keyboard(root: &str, quality: &str) -> Result<String, JsValue> {
    keyboard_json(root, quality).map_err(to_js_error)
}

/// MusicXML for a chord symbol
#[wasm_bindgen]
pub fn chord_musicxml(chord_symbol: &str) -> Result<String, JsValue> {
    harmonia::symbol_to_musicxml(chord_symbol).map_err(|e| to_js_error(error_to_binding_error(e)))
}

/// Prompt the host should send to its text-generation service
#[wasm_bindgen]
pub fn advice_prompt(root: &str, quality: &str) -> Result<String, JsValue> {
    advice_prompt_text(root, quality).map_err(to_js_error)
}

/// Validate the service's reply; a reply that cannot be used becomes the
/// fallback advice for the root
#[wasm_bindgen]
pub fn parse_advice(root: &str, reply: &str) -> Result<String, JsValue> {
    advice_json(root, reply).map_err(to_js_error)
}
