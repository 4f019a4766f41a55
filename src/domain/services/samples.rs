use crate::domain::models::GenerationMode;

const MAP_EXAMPLE: &str = r#"Create a starter village map with:

- A medieval village in the center, containing:
  * A two-storey tavern with automatic furnishing
  * A shop selling general goods
  * A blacksmith facing east
  * A quest-giver NPC in the middle of the village
  * A well and a notice board
  * The player spawn point

- A misty forest north of the village, containing:
  * 8 wolves and 5 goblins as enemies
  * A hidden treasure chest
  * Some harvestable herb nodes

- An abandoned mine entrance in the south-east corner:
  * Only enterable after a specific quest (check Player:HasFlag('Mine_Unlocked'))
  * Monsters of level 3-8

- A training ground east of the village

- A lake in the north-west with a fisherman's hut on the shore

- Terrain:
  * Slightly raised center
  * Small hills in the south-east
  * Lake in the north-west
  * Smoothed terrain

- Connections:
  * Village to training ground: stone road
  * Village to forest: dirt road
  * Village to mine: dirt road
  * Village to lakeside hut: footpath

- Atmosphere:
  * 10 AM, sunny
  * Peaceful nature ambience
  * Mysterious lighting in the forest"#;

const ENCOUNTER_EXAMPLE: &str = "I want a theft in the tavern where the player can choose to intervene, watch or leave.";

const MAP_PLACEHOLDER: &str = "Describe the map you want, e.g. create a starter village map with a village, forest and mine...";

const ENCOUNTER_PLACEHOLDER: &str = "Describe the encounter you want, e.g. a theft in the tavern where the player can choose to intervene, watch or leave.";

pub fn example_input(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Map => return MAP_EXAMPLE,
        GenerationMode::Encounter => return ENCOUNTER_EXAMPLE,
    }
}

pub fn description_placeholder(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Map => return MAP_PLACEHOLDER,
        GenerationMode::Encounter => return ENCOUNTER_PLACEHOLDER,
    }
}
