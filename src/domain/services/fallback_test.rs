use super::fallback_script;
use super::FALLBACK_PREFIX_CHARS;

#[test]
fn it_embeds_the_input() {
    let res = fallback_script("A starter village with a tavern");

    assert!(res.starts_with("function CreateStarterZone()"));
    assert!(res.contains("    -- Input: A starter village with a tavern...\n"));
}

#[test]
fn it_truncates_long_input_by_chars() {
    let input = "é".repeat(150);
    let res = fallback_script(&input);

    let expected = format!("-- Input: {}...", "é".repeat(FALLBACK_PREFIX_CHARS));
    assert!(res.contains(&expected));
    assert!(!res.contains(&"é".repeat(FALLBACK_PREFIX_CHARS + 1)));
}

#[test]
fn it_is_deterministic() {
    assert_eq!(fallback_script("same"), fallback_script("same"));
}

#[test]
fn it_renders_the_template() {
    let res = fallback_script("Village");
    insta::assert_snapshot!(res.lines().take(12).collect::<Vec<_>>().join("\n"), @r###"
    function CreateStarterZone()
        local map = Env.CreateMap(100, 100, 100)
        Env.SetMapName(map, "Starter Plains")
        Env.SetMapTheme(map, "Medieval")

        -- Map generated from the request
        -- Input: Village...

        Env.RaiseTerrain(map, {X=50, Y=50}, 30, 200, 0.8)
        Env.SmoothTerrain(map, 3)

        local villageBlock = Env.AddBlock(map, "Starter Village", {X=35, Y=30}, {X=30, Y=25})
    "###);
}
