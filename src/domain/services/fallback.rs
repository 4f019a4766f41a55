#[cfg(test)]
#[path = "fallback_test.rs"]
mod tests;

pub const FALLBACK_PREFIX_CHARS: usize = 100;
pub const FALLBACK_NOTICE: &str =
    "Showing placeholder data. Start the generation backend to use the agentic RAG pipeline.";

/// Placeholder script rendered when the backend cannot be reached. Only the
/// first characters of the input vary between calls.
pub fn fallback_script(input: &str) -> String {
    let prefix = input.chars().take(FALLBACK_PREFIX_CHARS).collect::<String>();

    return format!(
        r#"function CreateStarterZone()
    local map = Env.CreateMap(100, 100, 100)
    Env.SetMapName(map, "Starter Plains")
    Env.SetMapTheme(map, "Medieval")

    -- Map generated from the request
    -- Input: {prefix}...

    Env.RaiseTerrain(map, {{X=50, Y=50}}, 30, 200, 0.8)
    Env.SmoothTerrain(map, 3)

    local villageBlock = Env.AddBlock(map, "Starter Village", {{X=35, Y=30}}, {{X=30, Y=25}})
    Env.SetBlockType(villageBlock, "Village")
    Env.SetBlockProperty(villageBlock, "SafeZone", "true")

    Env.FlattenTerrain(map, {{X=50, Y=42}}, 12, 50)

    local inn = Env.AddBuilding(villageBlock, {{X=5, Y=5}}, {{X=5, Y=4}}, "Medieval", {{Pitch=0, Yaw=0, Roll=0}})
    Env.SetBuildingType(inn, "Tavern")
    Env.AddBuildingFloor(inn, 300)
    Env.AddBuildingFloor(inn, 300)
    Env.SetBuildingRoof(inn, "Pitched")
    Env.AutoFurnishBuilding(inn, "Tavern")

    Env.AddNPCSpawn(villageBlock, "NPC_QuestGiver", {{X=1200, Y=400, Z=0}}, {{Pitch=0, Yaw=0, Roll=0}})
    Env.AddSpawnPoint(villageBlock, "PlayerStart", {{X=1000, Y=200, Z=0}}, {{Pitch=0, Yaw=0, Roll=0}})

    local errors = Env.ValidateMap(map)
    if #errors > 0 then
        for _, err in ipairs(errors) do
            Log("[Error] " .. err)
        end
        return nil
    end

    Env.SaveMap(map, "StarterZone_v1")

    Env.BuildAsync(map, function(levelRoot)
        Log("Level build complete!")
        OnLevelReady(levelRoot)
    end)

    return map
end

function OnLevelReady(levelRoot)
    local spawnPos = World.GetSpawnPoint("PlayerStart")
    local player = World.SpawnPlayer(spawnPos)
end"#
    );
}
