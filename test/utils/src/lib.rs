/// Script in the shape the generation backend returns for a map request.
pub fn lua_script_fixture() -> &'static str {
    return r#"
-- Starter village
function CreateStarterZone()
    local map = Env.CreateMap(256, 256, 64)

    --[[
        Village in the center with a tavern,
        a shop and a blacksmith.
    ]]
    local village = map:AddArea("village", 96, 96, 64, 64)
    village:SpawnBuilding("tavern", { floors = 2, furnish = true })
    village:SpawnBuilding("shop")
    village:SpawnNpc("quest_giver", 128, 128)

    local forest = map:AddArea("forest", 64, 0, 128, 64)
    for i = 1, 8 do
        forest:SpawnEnemy("wolf", { level = 2 })
    end

    return map
end
"#
    .trim();
}

/// Same script with trailing whitespace and runs of blank lines.
pub fn messy_lua_script_fixture() -> String {
    return lua_script_fixture()
        .lines()
        .map(|line| {
            if line.is_empty() {
                return "\n\n   ".to_string();
            }
            return format!("{line}  \t");
        })
        .collect::<Vec<String>>()
        .join("\n")
        + "\n\n\n";
}
