use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_CATEGORIES: [&str; 5] = ["landscape", "portrait", "street", "nature", "urban"];

pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
    /// e.g. "f/2.8"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aperture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso: Option<String>,
    /// e.g. "1/250"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutter_speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub category: String,
    /// Fields this server doesn't model, kept so edits don't drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial photo used by updates. Only `id` is required; present fields overwrite
/// and an explicit `null` clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPatch {
    #[serde(default)]
    pub id: String,
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub camera: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub aperture: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub iso: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub shutter_speed: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub date: Option<Option<String>>,
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inserts non-null values and removes keys patched to `null`.
fn merge_extra(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (k, v) in patch {
        if v.is_null() {
            target.remove(&k);
        } else {
            target.insert(k, v);
        }
    }
}

impl Photo {
    /// Shallow merge: every field present in `patch` replaces the stored one.
    ///
    /// `url`, `title` and `category` always hold a string, so `null` leaves them as is.
    pub fn apply(&mut self, patch: &PhotoPatch) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt(target: &mut Option<String>, value: &Option<Option<String>>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut self.url, &patch.url);
        set(&mut self.title, &patch.title);
        set_opt(&mut self.description, &patch.description);
        set_opt(&mut self.location, &patch.location);
        set_opt(&mut self.camera, &patch.camera);
        set_opt(&mut self.aperture, &patch.aperture);
        set_opt(&mut self.iso, &patch.iso);
        set_opt(&mut self.shutter_speed, &patch.shutter_speed);
        set_opt(&mut self.date, &patch.date);
        set(&mut self.category, &patch.category);
        merge_extra(&mut self.extra, patch.extra.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_background_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_tint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_hero_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photography_hero_background: Option<String>,
    /// Category name to hero photo URL. Values are not checked against existing photos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_hero_photos: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings edit. Absent fields are kept and an explicit `null` clears the setting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSettingsPatch {
    #[serde(default, deserialize_with = "explicit_null")]
    pub hero_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub hero_subtitle: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub hero_background_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub hero_tint: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub page_background: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub homepage_hero_background: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub photography_hero_background: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub category_hero_photos: Option<Option<BTreeMap<String, String>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PhotoSettings {
    /// Top-level merge. Nested maps such as `categoryHeroPhotos` are replaced whole,
    /// so callers must send the complete map to keep existing keys.
    pub fn merge(&mut self, patch: PhotoSettingsPatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(value) = patch.$field { self.$field = value; })*
            };
        }
        take!(
            hero_title,
            hero_subtitle,
            hero_background_url,
            hero_tint,
            page_background,
            homepage_hero_background,
            photography_hero_background,
            category_hero_photos
        );
        merge_extra(&mut self.extra, patch.extra);
    }
}

/// Read failure details attached to a fallback document. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub error: String,
    pub bucket: String,
    pub key: String,
}

/// The single stored aggregate: photos, site settings and the category list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub settings: PhotoSettings,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MetadataDocument {
    fn default() -> Self {
        Self {
            photos: Vec::new(),
            settings: PhotoSettings::default(),
            categories: default_categories(),
            updated_at: None,
            debug: None,
            extra: Map::new(),
        }
    }
}

impl MetadataDocument {
    pub fn find_photo(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Appends `category` unless it is already listed.
    pub fn add_category(&mut self, category: &str) -> bool {
        if category.is_empty() || self.has_category(category) {
            return false;
        }
        self.categories.push(category.to_string());
        true
    }

    /// Hero photo entries whose URL no longer matches any photo.
    pub fn dangling_hero_photos(&self) -> Vec<(&str, &str)> {
        let Some(heroes) = &self.settings.category_hero_photos else {
            return Vec::new();
        };
        heroes
            .iter()
            .filter(|(_, url)| !self.photos.iter().any(|p| &p.url == *url))
            .map(|(category, url)| (category.as_str(), url.as_str()))
            .collect()
    }

    /// Photos whose category is not in the category list.
    pub fn orphaned_photos(&self) -> Vec<&Photo> {
        self.photos
            .iter()
            .filter(|p| !p.category.is_empty() && !self.has_category(&p.category))
            .collect()
    }
}
