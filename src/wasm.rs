use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn layout_menu(menu_json: &str, template_json: &str, selection_json: &str) -> Result<String, JsValue> {
    crate::paginate_json(menu_json, template_json, selection_json)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
