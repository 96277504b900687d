use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named group of users.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

impl Team {
    pub fn new(name: &str) -> Self {
        Team {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        }
    }
}
