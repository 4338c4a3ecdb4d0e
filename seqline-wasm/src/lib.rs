//! WebAssembly bindings for the diagram renderer

use seqline_core::DiagramOptions;
use wasm_bindgen::prelude::*;

/// Render diagram source to SVG with the default theme
#[wasm_bindgen]
pub fn render(source: &str) -> Result<String, JsValue> {
    seqline_core::render(source).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render diagram source to SVG with a named theme
#[wasm_bindgen]
pub fn render_with_theme(source: &str, theme: &str) -> Result<String, JsValue> {
    let options = DiagramOptions::by_name(theme)
        .ok_or_else(|| JsValue::from_str(&format!("unknown theme: {theme}")))?;
    seqline_core::render_with_options(source, &options)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Names accepted by [`render_with_theme`]
#[wasm_bindgen]
pub fn available_themes() -> Vec<String> {
    DiagramOptions::available_themes()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Crate version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_svg() {
        let svg = render("a -> b: hi").unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn themed_render_matches_core() {
        let here = render_with_theme("a -> b: hi", "midnight").unwrap();
        let core =
            seqline_core::render_with_options("a -> b: hi", &DiagramOptions::midnight()).unwrap();
        assert_eq!(here, core);
    }

    #[test]
    fn lists_themes() {
        assert!(available_themes().contains(&"default".to_string()));
    }
}
