//! Model categories and the on-disk folder each one maps to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of model asset as reported by the platform's `type` field.
///
/// Unrecognised values deserialize as [`ModelCategory::Other`] so that new
/// platform categories never break catalog loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelCategory {
    Checkpoint,
    TextualInversion,
    Hypernetwork,
    #[serde(rename = "LORA")]
    Lora,
    LoCon,
    #[serde(rename = "VAE")]
    Vae,
    Controlnet,
    Upscaler,
    #[serde(alias = "Motionmodule")]
    MotionModule,
    #[serde(alias = "Aesthetic Gradient")]
    AestheticGradient,
    Poses,
    Wildcards,
    Workflows,
    #[default]
    #[serde(other)]
    Other,
}

impl ModelCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 14] = [
        Self::Checkpoint,
        Self::TextualInversion,
        Self::Hypernetwork,
        Self::Lora,
        Self::LoCon,
        Self::Vae,
        Self::Controlnet,
        Self::Upscaler,
        Self::MotionModule,
        Self::AestheticGradient,
        Self::Poses,
        Self::Wildcards,
        Self::Workflows,
        Self::Other,
    ];

    /// Folder, relative to the destination root, that holds this category.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Checkpoint => "models/Stable-diffusion",
            Self::TextualInversion | Self::AestheticGradient => "embeddings",
            Self::Hypernetwork => "models/hypernetworks",
            Self::Lora | Self::LoCon => "models/Lora",
            Self::Vae => "models/VAE",
            Self::Controlnet => "models/controlnet",
            Self::Upscaler => "models/upscale_models",
            Self::MotionModule => "models/motion_module",
            Self::Poses => "models/poses",
            Self::Wildcards => "wildcards",
            Self::Workflows => "workflows",
            Self::Other => "models/other",
        }
    }

    /// Platform spelling of the category (the value of the API `type` field).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkpoint => "Checkpoint",
            Self::TextualInversion => "TextualInversion",
            Self::Hypernetwork => "Hypernetwork",
            Self::Lora => "LORA",
            Self::LoCon => "LoCon",
            Self::Vae => "VAE",
            Self::Controlnet => "Controlnet",
            Self::Upscaler => "Upscaler",
            Self::MotionModule => "MotionModule",
            Self::AestheticGradient => "AestheticGradient",
            Self::Poses => "Poses",
            Self::Wildcards => "Wildcards",
            Self::Workflows => "Workflows",
            Self::Other => "Other",
        }
    }

    /// Coarse bucket used by the storage usage report.
    #[must_use]
    pub const fn storage_group(self) -> StorageGroup {
        match self {
            Self::Lora | Self::LoCon => StorageGroup::Loras,
            Self::Checkpoint => StorageGroup::Checkpoints,
            Self::TextualInversion | Self::AestheticGradient => StorageGroup::Embeddings,
            _ => StorageGroup::Other,
        }
    }

    /// Unique category folders, in display order.
    pub fn folders() -> impl Iterator<Item = &'static str> {
        let mut seen: Vec<&'static str> = Vec::with_capacity(Self::ALL.len());
        Self::ALL.into_iter().filter_map(move |category| {
            let folder = category.folder();
            if seen.contains(&folder) {
                None
            } else {
                seen.push(folder);
                Some(folder)
            }
        })
    }
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelCategory {
    type Err = std::convert::Infallible;

    /// Case-insensitive parse; unknown names become `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        let category = Self::ALL
            .into_iter()
            .find(|c| c.as_str().to_ascii_lowercase() == normalized)
            .unwrap_or(Self::Other);
        Ok(category)
    }
}

/// Buckets shown in the storage usage report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StorageGroup {
    Loras,
    Checkpoints,
    Embeddings,
    Other,
}

impl StorageGroup {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Loras => "LoRAs",
            Self::Checkpoints => "Checkpoints",
            Self::Embeddings => "Embeddings",
            Self::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_names_deserialize() {
        let lora: ModelCategory = serde_json::from_str("\"LORA\"").unwrap();
        assert_eq!(lora, ModelCategory::Lora);

        let vae: ModelCategory = serde_json::from_str("\"VAE\"").unwrap();
        assert_eq!(vae, ModelCategory::Vae);

        let legacy: ModelCategory = serde_json::from_str("\"Aesthetic Gradient\"").unwrap();
        assert_eq!(legacy, ModelCategory::AestheticGradient);
    }

    #[test]
    fn test_unknown_category_is_other() {
        let dora: ModelCategory = serde_json::from_str("\"DoRA\"").unwrap();
        assert_eq!(dora, ModelCategory::Other);
        assert_eq!(dora.folder(), "models/other");
    }

    #[test]
    fn test_lora_and_locon_share_folder() {
        assert_eq!(ModelCategory::Lora.folder(), "models/Lora");
        assert_eq!(ModelCategory::LoCon.folder(), ModelCategory::Lora.folder());
    }

    #[test]
    fn test_folders_are_unique() {
        let folders: Vec<_> = ModelCategory::folders().collect();
        assert_eq!(folders.len(), 12);
        assert_eq!(folders[0], "models/Stable-diffusion");
    }

    #[test]
    fn test_from_str_is_lenient() {
        assert_eq!("lora".parse::<ModelCategory>().unwrap(), ModelCategory::Lora);
        assert_eq!(
            "textual-inversion".parse::<ModelCategory>().unwrap(),
            ModelCategory::TextualInversion
        );
        assert_eq!("nope".parse::<ModelCategory>().unwrap(), ModelCategory::Other);
    }

    #[test]
    fn test_display_uses_platform_spelling() {
        assert_eq!(ModelCategory::Lora.to_string(), "LORA");
        assert_eq!(ModelCategory::Checkpoint.storage_group().label(), "Checkpoints");
    }
}
