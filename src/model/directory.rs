use serde::{Deserialize, Deserializer, Serialize};

/// What a directory entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Profile,
    Event,
}

/// A selectable search entry (person or event)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub display_name: String,
    pub kind: EntryKind,
}

impl DirectoryEntry {
    /// In-app route opened when this entry is selected
    pub fn route(&self) -> String {
        match self.kind {
            EntryKind::Profile => format!("/profile/{}", self.id),
            EntryKind::Event => format!("/event/{}", self.id),
        }
    }
}

/// Profile as returned by the directory collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
}

/// Event as returned by the directory collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
}

/// Events visible to the current user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLists {
    #[serde(default)]
    pub owned: Vec<EventRecord>,
    #[serde(default)]
    pub invited: Vec<EventRecord>,
}

impl From<ProfileRecord> for DirectoryEntry {
    fn from(p: ProfileRecord) -> Self {
        DirectoryEntry {
            id: p.id,
            display_name: p.username,
            kind: EntryKind::Profile,
        }
    }
}

impl From<EventRecord> for DirectoryEntry {
    fn from(e: EventRecord) -> Self {
        DirectoryEntry {
            id: e.id,
            display_name: e.title,
            kind: EntryKind::Event,
        }
    }
}

/// Backends hand out numeric profile ids and UUID event ids
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
