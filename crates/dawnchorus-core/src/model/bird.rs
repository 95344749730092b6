use serde::{Deserialize, Serialize};

/// Icon resources for a bird.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirdImages {
    /// Resource reference for the bird's face, used as the large notification icon.
    pub face: String,
}

/// Platform-specific notification sound resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdSound {
    pub ios_notification: String,
    pub android_notification: String,
}

/// A bird that can sing in a chorus. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bird {
    pub name: String,
    pub images: BirdImages,
    pub sound: BirdSound,
}

impl Bird {
    /// Build a bird whose resources follow the bundled naming scheme
    /// (`{slug}_face`, `{slug}.caf`, `{slug}`).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = name.to_lowercase().replace(' ', "_");
        Self {
            images: BirdImages {
                face: format!("{slug}_face"),
            },
            sound: BirdSound {
                ios_notification: format!("{slug}.caf"),
                android_notification: slug,
            },
            name,
        }
    }
}
