//! Request descriptors for the six supported API calls.
//!
//! An [`Operation`] is a pure description: endpoint path plus the fields it
//! adds to the common credential fields. Building the payload never fails
//! and is deterministic for a given credential.

use crate::credential::Credential;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

pub const PATH_COLLECT_PICKUP_BATCH: &str = "/account/collect_pickup_batch";
pub const PATH_GET_ACCOUNT_WORLD_QUESTS: &str = "/account/get_account_world_quests";
pub const PATH_CLAIM_QUEST_REWARD: &str = "/account/claim_quest_reward";
pub const PATH_COLLECT_COLLECTIBLE: &str = "/account/collect_collectible";
pub const PATH_SEND_LIGHT: &str = "/service/relationship/api/v1/free_gifts/send";
pub const PATH_SEND_HEART: &str = "/account/send_message";

/// Level identifier as found in the batch source; echoed back in the same JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelId {
    Text(String),
    Number(i64),
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelId::Text(s) => f.write_str(s),
            LevelId::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CollectPickupBatch {
        level_id: LevelId,
        pickup_ids: Vec<Value>,
    },
    GetAccountWorldQuests,
    ClaimQuestReward {
        name: String,
    },
    CollectCollectible {
        name: String,
    },
    SendLight {
        target_id: String,
        target_name: String,
    },
    SendHeart {
        target_id: String,
        target_name: String,
    },
}

impl Operation {
    pub fn path(&self) -> &'static str {
        match self {
            Operation::CollectPickupBatch { .. } => PATH_COLLECT_PICKUP_BATCH,
            Operation::GetAccountWorldQuests => PATH_GET_ACCOUNT_WORLD_QUESTS,
            Operation::ClaimQuestReward { .. } => PATH_CLAIM_QUEST_REWARD,
            Operation::CollectCollectible { .. } => PATH_COLLECT_COLLECTIBLE,
            Operation::SendLight { .. } => PATH_SEND_LIGHT,
            Operation::SendHeart { .. } => PATH_SEND_HEART,
        }
    }

    /// Short request kind used in retry diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CollectPickupBatch { .. } => "Level",
            Operation::GetAccountWorldQuests => "Pre",
            Operation::ClaimQuestReward { .. } => "Quest",
            Operation::CollectCollectible { .. } => "Collectible",
            Operation::SendLight { .. } => "Light",
            Operation::SendHeart { .. } => "Heart",
        }
    }

    /// What the request is about: level id, quest name, target name.
    pub fn subject(&self) -> String {
        match self {
            Operation::CollectPickupBatch { level_id, .. } => level_id.to_string(),
            Operation::GetAccountWorldQuests => "Pre".to_string(),
            Operation::ClaimQuestReward { name } | Operation::CollectCollectible { name } => {
                name.clone()
            }
            Operation::SendLight { target_name, .. } | Operation::SendHeart { target_name, .. } => {
                target_name.clone()
            }
        }
    }

    /// Label shown next to the outcome in run reports.
    pub fn label(&self) -> String {
        match self {
            Operation::CollectPickupBatch { level_id, .. } => format!("Level {}", level_id),
            Operation::GetAccountWorldQuests => "Pre-process".to_string(),
            Operation::ClaimQuestReward { name } => format!("Quest '{}'", name),
            Operation::CollectCollectible { name } => format!("Collectible '{}'", name),
            Operation::SendLight { target_name, .. } => format!("Light to {}", target_name),
            Operation::SendHeart { target_name, .. } => format!("Heart to {}", target_name),
        }
    }

    pub fn payload(&self, credential: &Credential) -> Value {
        let mut body = match self {
            Operation::CollectPickupBatch {
                level_id,
                pickup_ids,
            } => json!({
                "emitters": [],
                "global_pickup_ids": [],
                "level_id": level_id,
                "pickup_ids": pickup_ids,
            }),
            Operation::GetAccountWorldQuests => json!({}),
            Operation::ClaimQuestReward { name } => json!({
                "bonus_percent": 0,
                "name": name,
            }),
            Operation::CollectCollectible { name } => json!({
                "carrying": false,
                "name": name,
            }),
            Operation::SendLight { target_id, .. } => json!({
                "gift_type": "gift_heart_wax",
                "target": target_id,
            }),
            Operation::SendHeart { target_id, .. } => json!({
                "gift_type": "gift",
                "target": target_id,
            }),
        };

        if let Value::Object(map) = &mut body {
            insert_credential(map, credential);
        }
        body
    }
}

fn insert_credential(map: &mut Map<String, Value>, credential: &Credential) {
    map.insert(
        "session".to_string(),
        Value::String(credential.session_token().to_string()),
    );
    map.insert(
        "user".to_string(),
        Value::String(credential.user_id().to_string()),
    );
    map.insert(
        "user_id".to_string(),
        Value::String(credential.user_id().to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cred() -> Credential {
        Credential::new("sess", "uid").unwrap()
    }

    #[test]
    fn test_pickup_payload_fields() {
        let op = Operation::CollectPickupBatch {
            level_id: LevelId::Text("DawnCave".to_string()),
            pickup_ids: vec![json!(1), json!(2)],
        };
        assert_eq!(
            op.payload(&cred()),
            json!({
                "emitters": [],
                "global_pickup_ids": [],
                "level_id": "DawnCave",
                "pickup_ids": [1, 2],
                "session": "sess",
                "user": "uid",
                "user_id": "uid",
            })
        );
        assert_eq!(op.path(), "/account/collect_pickup_batch");
        assert_eq!(op.label(), "Level DawnCave");
    }

    #[test]
    fn test_numeric_level_id_keeps_type() {
        let op = Operation::CollectPickupBatch {
            level_id: LevelId::Number(42),
            pickup_ids: vec![json!("a")],
        };
        assert_eq!(op.payload(&cred())["level_id"], json!(42));
    }

    #[test]
    fn test_preflight_payload_is_credentials_only() {
        assert_eq!(
            Operation::GetAccountWorldQuests.payload(&cred()),
            json!({"session": "sess", "user": "uid", "user_id": "uid"})
        );
    }

    #[test]
    fn test_claim_payloads() {
        let quest = Operation::ClaimQuestReward {
            name: "q1".to_string(),
        };
        assert_eq!(quest.payload(&cred())["bonus_percent"], json!(0));
        assert_eq!(quest.payload(&cred())["name"], json!("q1"));

        let collectible = Operation::CollectCollectible {
            name: "c1".to_string(),
        };
        assert_eq!(collectible.payload(&cred())["carrying"], json!(false));
        assert_eq!(collectible.path(), "/account/collect_collectible");
    }

    #[test]
    fn test_gift_payloads() {
        let light = Operation::SendLight {
            target_id: "t-1".to_string(),
            target_name: "Alice".to_string(),
        };
        let heart = Operation::SendHeart {
            target_id: "t-1".to_string(),
            target_name: "Alice".to_string(),
        };

        assert_eq!(light.payload(&cred())["gift_type"], json!("gift_heart_wax"));
        assert_eq!(light.payload(&cred())["target"], json!("t-1"));
        assert_eq!(light.path(), "/service/relationship/api/v1/free_gifts/send");
        assert_eq!(heart.payload(&cred())["gift_type"], json!("gift"));
        assert_eq!(heart.path(), "/account/send_message");
        assert_eq!(heart.label(), "Heart to Alice");
    }
}
