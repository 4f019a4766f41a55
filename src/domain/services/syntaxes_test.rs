use super::Syntaxes;

#[test]
fn it_finds_lua() {
    assert_eq!(Syntaxes::lua().name, "Lua");
}

#[test]
fn it_lists_default_themes() {
    let themes = Syntaxes::themes();
    assert!(themes.contains(&"base16-ocean.dark".to_string()));
    assert!(Syntaxes::theme("base16-ocean.dark").is_ok());
    assert!(Syntaxes::theme("not-a-theme").is_err());
}

#[test]
fn it_highlights_every_line() {
    let theme = Syntaxes::theme("base16-ocean.dark").unwrap();
    let script = "-- comment\nlocal map = Env.CreateMap(100, 100, 100)\n\nreturn map";
    let lines = Syntaxes::highlight_lua(script, theme);

    assert_eq!(lines.len(), 4);

    let text = lines
        .iter()
        .map(|line| {
            return line
                .spans
                .iter()
                .map(|span| return span.content.to_string())
                .collect::<String>();
        })
        .collect::<Vec<String>>();
    assert_eq!(text, script.lines().collect::<Vec<&str>>());
}

#[test]
fn it_highlights_block_comments() {
    let theme = Syntaxes::theme("base16-ocean.dark").unwrap();
    let script = test_utils::lua_script_fixture();
    let lines = Syntaxes::highlight_lua(script, theme);

    assert_eq!(lines.len(), script.lines().count());
    assert!(lines.iter().any(|line| return line.spans.len() > 1));
}
