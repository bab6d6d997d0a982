use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A video remembered by the session profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedVideo {
    pub video_id: String,
    pub title: String,
    pub summaries: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl SavedVideo {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>, summaries: Vec<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            summaries,
            saved_at: Utc::now(),
        }
    }
}

/// Where a session keeps the videos the user analyzed
pub trait ProfileStore: Send {
    /// Profile owner name
    fn name(&self) -> &str;

    fn rename(&mut self, name: &str);

    /// Save a video, replacing an earlier entry with the same id
    fn save(&mut self, video: SavedVideo);

    /// Saved videos in the order they were first saved
    fn list(&self) -> Vec<SavedVideo>;
}

/// Session-scoped profile; gone when the process exits
#[derive(Debug, Clone, Serialize)]
pub struct InMemoryProfile {
    name: String,
    videos: Vec<SavedVideo>,
}

impl InMemoryProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            videos: Vec::new(),
        }
    }
}

impl Default for InMemoryProfile {
    fn default() -> Self {
        Self::new("Guest")
    }
}

impl ProfileStore for InMemoryProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn save(&mut self, video: SavedVideo) {
        match self.videos.iter_mut().find(|saved| saved.video_id == video.video_id) {
            Some(existing) => *existing = video,
            None => self.videos.push(video),
        }
    }

    fn list(&self) -> Vec<SavedVideo> {
        self.videos.clone()
    }
}
