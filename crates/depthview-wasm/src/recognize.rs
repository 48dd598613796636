//! Match policy bindings.
//!
//! Detection runs in the browser (for example through the `BarcodeDetector`
//! API). Its results are passed here to be classified against the reference
//! code.

use depthview_core::recognize::{classify, Barcode, BarcodeFormat, ReferenceCode};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::js_error;

/// Result handed back to JavaScript.
#[derive(Debug, Serialize)]
struct Classification {
    verdict: depthview_core::Verdict,
    code: Option<String>,
}

/// Classify detected code values against `reference`.
///
/// Returns `{ verdict, code }` where `verdict` is one of `"Recyclable"`,
/// `"NotRecyclable"` or `"NoCode"`.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const found = await detector.detect(canvas);
/// const { verdict } = classify_codes(found.map(b => b.rawValue), "9300675024235");
/// ```
#[wasm_bindgen]
pub fn classify_codes(values: Vec<String>, reference: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&classify_values(values, reference)).map_err(js_error)
}

fn classify_values(values: Vec<String>, reference: &str) -> Classification {
    let codes: Vec<Barcode> = values
        .into_iter()
        .map(|value| Barcode::new(value, BarcodeFormat::Unknown))
        .collect();
    let outcome = classify(&codes, &ReferenceCode::new(reference));
    Classification {
        verdict: outcome.verdict(),
        code: outcome.code().map(|code| code.value.clone()),
    }
}
