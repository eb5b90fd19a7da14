//! Generated assets.
//!
//! The gateway only drafts assets; persisting them is the caller's choice.

use crate::request::MediaKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A generated media asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Asset id
    pub id: Uuid,
    /// Owning user, filled in by the persistence service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Media type
    #[serde(rename = "type")]
    pub asset_type: MediaKind,
    /// Where the media lives
    pub url: String,
    /// Prompt that produced it
    pub prompt: String,
    /// Free-form metadata (model id, vendor job id)
    #[serde(default)]
    pub metadata: Value,
    /// Draft creation time
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Draft an asset for a finished generation
    #[must_use]
    pub fn draft(
        asset_type: MediaKind,
        url: impl Into<String>,
        prompt: impl Into<String>,
        model_id: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            asset_type,
            url: url.into(),
            prompt: prompt.into(),
            metadata: serde_json::json!({ "model": model_id }),
            created_at: Utc::now(),
        }
    }

    /// Attach the vendor job id to the metadata
    #[must_use]
    pub fn with_job_id(mut self, request_id: &str) -> Self {
        if let Value::Object(ref mut map) = self.metadata {
            map.insert("requestId".to_string(), Value::String(request_id.to_string()));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_serialises_type_field() {
        let asset = Asset::draft(MediaKind::Video, "https://x/y.mp4", "a duel", "luma/ray-2/text-to-video")
            .with_job_id("gen-9");
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["metadata"]["model"], "luma/ray-2/text-to-video");
        assert_eq!(json["metadata"]["requestId"], "gen-9");
        assert!(json.get("userId").is_none());
    }
}
