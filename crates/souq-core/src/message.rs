use serde::{Deserialize, Serialize};

/// Deep link used when the caller does not supply one.
pub const DEFAULT_LINK: &str = "/";

/// One push message as composed by application code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub title: String,
    pub body: String,
    /// Deep link opened when the notification is tapped.
    #[serde(default = "default_link")]
    pub link: String,
}

fn default_link() -> String {
    DEFAULT_LINK.to_string()
}

impl Message {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            link: default_link(),
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}
