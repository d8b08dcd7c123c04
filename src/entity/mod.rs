use serde::{Deserialize, Serialize};

/// Large counters arrive either as JSON numbers or as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BigCounter {
    Number(u64),
    Text(String),
}

impl Default for BigCounter {
    fn default() -> Self {
        BigCounter::Number(0)
    }
}

/// A cybor owned by the connected account, in the shape the game consumes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cybor {
    pub race_name: String,
    pub basic_damage: u32,
    pub basic_hp: u32,
    pub basic_move_speed: u32,
    pub basic_knockdown_hit: u32,
    pub score_per_block: BigCounter,
    pub is_have_finishing_skill: bool,
    pub mint_at: u64,
    pub image: String,
    pub level: u32,
    pub grade: u32,
    pub lucky: u32,
    pub exp: BigCounter,
    pub is_freeze: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accept_numbers_and_strings() {
        let raw = r#"{
            "race_name": "human", "basic_damage": 10, "basic_hp": 100,
            "basic_move_speed": 3, "basic_knockdown_hit": 1,
            "score_per_block": "18446744073709551615",
            "is_have_finishing_skill": true, "mint_at": 1700000000,
            "image": "human.png", "level": 2, "grade": 1, "lucky": 7,
            "exp": 350, "is_freeze": false
        }"#;
        let cybor: Cybor = serde_json::from_str(raw).unwrap();
        assert_eq!(cybor.score_per_block, BigCounter::Text("18446744073709551615".into()));
        assert_eq!(cybor.exp, BigCounter::Number(350));
        assert!(cybor.is_have_finishing_skill);
    }
}
