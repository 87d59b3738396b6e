#[cfg(test)]
#[path = "turn_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: &str) -> Turn {
        return Turn {
            role,
            content: content.to_string(),
        };
    }
}

/// Chat history sent to the completion service. A system turn can only ever
/// be the first turn, and after it user and assistant turns alternate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn reset(&mut self, system: &str, user: &str) {
        self.turns = vec![Turn::new(Role::System, system), Turn::new(Role::User, user)];
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn push_user(&mut self, content: &str) -> Result<()> {
        match self.turns.last() {
            None => bail!("A question needs a routine to ask about"),
            Some(turn) if turn.role == Role::User => {
                bail!("A question can't follow an unanswered question")
            }
            _ => (),
        }

        self.turns.push(Turn::new(Role::User, content));
        return Ok(());
    }

    /// Drops the last turn when it is a question that never got an answer.
    /// The routine request itself is never dropped.
    pub fn drop_unanswered(&mut self) -> bool {
        if self.turns.len() > 2 && self.turns.last().map(|e| return e.role) == Some(Role::User) {
            self.turns.pop();
            return true;
        }

        return false;
    }

    pub fn push_assistant(&mut self, content: &str) -> Result<()> {
        match self.turns.last() {
            None => bail!("An assistant reply needs a preceding turn"),
            Some(turn) if turn.role == Role::Assistant => {
                bail!("An assistant reply can't follow another assistant reply")
            }
            _ => (),
        }

        self.turns.push(Turn::new(Role::Assistant, content));
        return Ok(());
    }

    pub fn turns(&self) -> &[Turn] {
        return &self.turns;
    }

    pub fn len(&self) -> usize {
        return self.turns.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.turns.is_empty();
    }
}
