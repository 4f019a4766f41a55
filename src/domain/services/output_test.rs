use std::fs;

use anyhow::Result;

use super::download_file_name;
use super::format_script;
use super::write_download;
use super::write_download_at;

#[test]
fn it_formats_scripts() {
    let text = "\n\nfunction Main()   \n    Log(\"hi\")\t\n\n\n\n    return nil\n\n \n  \nend  \n\n";
    insta::assert_snapshot!(format_script(text), @r###"
    function Main()
        Log("hi")

        return nil

    end
    "###);
}

#[test]
fn it_formats_idempotently() {
    let text = "local a = 1  \n\n\n\nlocal b = 2\r\n\r\n\r\nlocal c = 3\n";
    let once = format_script(text);
    assert_eq!(once, "local a = 1\n\nlocal b = 2\n\nlocal c = 3");
    assert_eq!(format_script(&once), once);
}

#[test]
fn it_keeps_single_blank_lines() {
    assert_eq!(format_script("a\n\nb"), "a\n\nb");
}

#[test]
fn it_names_downloads() {
    assert_eq!(
        download_file_name(1700000000000, 0),
        "map_script_1700000000000.lua"
    );
    assert_eq!(
        download_file_name(1700000000000, 2),
        "map_script_1700000000000_2.lua"
    );
}

#[test]
fn it_writes_downloads() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_download(&dir.path().join("scripts"), "function Main() end")?;

    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("map_script_"));
    assert!(file_name.ends_with(".lua"));
    assert_eq!(fs::read_to_string(path)?, "function Main() end");

    return Ok(());
}

#[test]
fn it_never_overwrites_downloads() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let first = write_download_at(dir.path(), "-- first", 1700000000000)?;
    let second = write_download_at(dir.path(), "-- second", 1700000000000)?;
    let third = write_download_at(dir.path(), "-- third", 1700000000000)?;

    assert_eq!(first, dir.path().join("map_script_1700000000000.lua"));
    assert_eq!(second, dir.path().join("map_script_1700000000000_1.lua"));
    assert_eq!(third, dir.path().join("map_script_1700000000000_2.lua"));
    assert_eq!(fs::read_to_string(first)?, "-- first");
    assert_eq!(fs::read_to_string(second)?, "-- second");
    assert_eq!(fs::read_to_string(third)?, "-- third");

    return Ok(());
}

#[test]
fn it_formats_backend_scripts() {
    let formatted = format_script(&test_utils::messy_lua_script_fixture());
    assert_eq!(formatted, test_utils::lua_script_fixture());
}
