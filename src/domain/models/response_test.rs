use serde_json::json;

use super::GenerationResponse;
use super::GENERIC_FAILURE_MESSAGE;

#[test]
fn it_prefers_the_script() {
    let res = GenerationResponse::from_value(&json!({
        "success": true,
        "luaScript": "function CreateStarterZone() end",
        "error": "ignored",
        "model": "gpt-4.1",
        "knowledgeBase": "map"
    }));

    assert_eq!(res.success, Some(true));
    assert_eq!(res.knowledge_base, Some("map".to_string()));
    assert_eq!(res.display_text(), "function CreateStarterZone() end");
}

#[test]
fn it_falls_back_to_the_error() {
    let res = GenerationResponse::from_value(&json!({
        "success": false,
        "luaScript": "",
        "error": "Input must not be empty"
    }));

    assert_eq!(res.display_text(), "Input must not be empty");
}

#[test]
fn it_shows_generic_failure_for_unknown_shapes() {
    let res = GenerationResponse::from_value(&json!(["luaScript"]));
    assert_eq!(res, GenerationResponse::default());
    assert_eq!(res.display_text(), GENERIC_FAILURE_MESSAGE);

    let res = GenerationResponse::from_value(&json!({ "luaScript": 42 }));
    assert_eq!(res.lua_script, None);
    assert_eq!(res.display_text(), GENERIC_FAILURE_MESSAGE);
}
