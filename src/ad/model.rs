use crate::ad::media_url::{check_http_url, check_media_source};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Where in the playback session an ad is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    Preroll,
    /// Accepted in pools, never scheduled by the sequencer
    Midroll,
    Postroll,
}

/// Whether (and how) a viewer may dismiss an ad early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCategory {
    Skippable,
    NonSkippable,
    /// Short spot that is never skippable
    Bumper,
}

impl SkipCategory {
    /// `Bumper` and `NonSkippable` never allow a skip, whatever the skip offset says.
    pub fn allows_skip(self) -> bool {
        matches!(self, SkipCategory::Skippable)
    }
}

/// A candidate ad as delivered by the ad data service.
///
/// Field names follow the JSON served by `/api/ads` (camelCase, `type`,
/// `category`, `videoUrl`). The sequencer treats a pool of these as
/// immutable for one playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    #[serde(rename = "category")]
    pub skip_category: SkipCategory,
    #[serde(rename = "videoUrl")]
    pub media_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    /// Total duration in seconds
    pub duration: f64,
    /// Offset in seconds after which a skippable ad may be dismissed
    #[serde(default)]
    pub skip_after: Option<f64>,
    /// `null` in the source data counts as inactive
    #[serde(default, deserialize_with = "bool_from_nullable")]
    pub is_active: bool,
}

/// Reasons an ad is excluded from selection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidAd {
    #[error("duration {0} is negative or not finite")]
    Duration(f64),

    #[error("skip offset {0} is negative or not finite")]
    SkipOffset(f64),

    #[error("skip offset {skip_after}s is past the end of a {duration}s ad")]
    SkipPastEnd { skip_after: f64, duration: f64 },

    #[error("media URL rejected: {0}")]
    MediaUrl(String),

    #[error("click-through URL rejected: {0}")]
    LinkUrl(String),
}

impl Advertisement {
    /// Check the ad's declared timing and URLs.
    ///
    /// A failing ad is ineligible for selection; it is never an error the
    /// viewer sees.
    pub fn validate(&self) -> Result<(), InvalidAd> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(InvalidAd::Duration(self.duration));
        }

        if let Some(skip_after) = self.skip_after {
            if !skip_after.is_finite() || skip_after < 0.0 {
                return Err(InvalidAd::SkipOffset(skip_after));
            }
            if skip_after > self.duration {
                return Err(InvalidAd::SkipPastEnd {
                    skip_after,
                    duration: self.duration,
                });
            }
        }

        check_media_source(&self.media_url).map_err(InvalidAd::MediaUrl)?;

        if let Some(link) = &self.link_url {
            check_http_url(link).map_err(InvalidAd::LinkUrl)?;
        }

        Ok(())
    }
}

/// The data service uses integer primary keys; other sources may use strings.
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

fn bool_from_nullable<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a valid, active ad for tests
    pub fn ad(id: &str, slot: SlotType, category: SkipCategory, duration: f64) -> Advertisement {
        Advertisement {
            id: id.to_string(),
            title: format!("Ad {id}"),
            slot_type: slot,
            skip_category: category,
            media_url: format!("https://cdn.example.com/ads/{id}.mp4"),
            link_url: None,
            duration,
            skip_after: None,
            is_active: true,
        }
    }

    pub fn skippable(id: &str, slot: SlotType, duration: f64, skip_after: f64) -> Advertisement {
        Advertisement {
            skip_after: Some(skip_after),
            ..ad(id, slot, SkipCategory::Skippable, duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn deserializes_data_service_json() {
        let json = r#"{
            "id": 7,
            "title": "Summer promo",
            "type": "preroll",
            "category": "skippable",
            "videoUrl": "https://cdn.example.com/promo.mp4",
            "linkUrl": "https://shop.example.com",
            "duration": 15,
            "skipAfter": 5,
            "isActive": true
        }"#;

        let ad: Advertisement = serde_json::from_str(json).unwrap();
        assert_eq!(ad.id, "7");
        assert_eq!(ad.slot_type, SlotType::Preroll);
        assert_eq!(ad.skip_category, SkipCategory::Skippable);
        assert_eq!(ad.media_url, "https://cdn.example.com/promo.mp4");
        assert_eq!(ad.link_url.as_deref(), Some("https://shop.example.com"));
        assert_eq!(ad.duration, 15.0);
        assert_eq!(ad.skip_after, Some(5.0));
        assert!(ad.is_active);
    }

    #[test]
    fn null_fields_take_defaults() {
        let json = r#"{
            "id": "bumper-1",
            "title": "Sting",
            "type": "postroll",
            "category": "non_skippable",
            "videoUrl": "https://cdn.example.com/sting.mp4",
            "linkUrl": null,
            "duration": 6,
            "skipAfter": null,
            "isActive": null
        }"#;

        let ad: Advertisement = serde_json::from_str(json).unwrap();
        assert_eq!(ad.id, "bumper-1");
        assert_eq!(ad.skip_category, SkipCategory::NonSkippable);
        assert_eq!(ad.link_url, None);
        assert_eq!(ad.skip_after, None);
        assert!(!ad.is_active, "null isActive counts as inactive");
    }

    #[test]
    fn only_skippable_category_allows_skip() {
        assert!(SkipCategory::Skippable.allows_skip());
        assert!(!SkipCategory::NonSkippable.allows_skip());
        assert!(!SkipCategory::Bumper.allows_skip());
    }

    #[test]
    fn valid_ad_passes() {
        let ad = skippable("a", SlotType::Preroll, 15.0, 5.0);
        assert_eq!(ad.validate(), Ok(()));
    }

    #[test]
    fn skip_offset_equal_to_duration_is_valid() {
        let ad = skippable("a", SlotType::Preroll, 10.0, 10.0);
        assert_eq!(ad.validate(), Ok(()));
    }

    #[test]
    fn rejects_negative_duration() {
        let ad = ad("a", SlotType::Preroll, SkipCategory::Bumper, -1.0);
        assert_eq!(ad.validate(), Err(InvalidAd::Duration(-1.0)));
    }

    #[test]
    fn rejects_non_finite_duration() {
        let ad = ad("a", SlotType::Preroll, SkipCategory::Bumper, f64::NAN);
        assert!(matches!(ad.validate(), Err(InvalidAd::Duration(_))));
    }

    #[test]
    fn rejects_skip_offset_past_end() {
        let ad = skippable("a", SlotType::Preroll, 10.0, 12.0);
        assert_eq!(
            ad.validate(),
            Err(InvalidAd::SkipPastEnd {
                skip_after: 12.0,
                duration: 10.0
            })
        );
    }

    #[test]
    fn rejects_negative_skip_offset() {
        let ad = skippable("a", SlotType::Preroll, 10.0, -2.0);
        assert_eq!(ad.validate(), Err(InvalidAd::SkipOffset(-2.0)));
    }

    #[test]
    fn rejects_bad_media_url() {
        let mut ad = ad("a", SlotType::Preroll, SkipCategory::Bumper, 6.0);
        ad.media_url = "file:///srv/ads/ad.mp4".to_string();
        assert!(matches!(ad.validate(), Err(InvalidAd::MediaUrl(_))));
    }

    #[test]
    fn accepts_uploaded_media_path() {
        let mut ad = ad("a", SlotType::Preroll, SkipCategory::Bumper, 6.0);
        ad.media_url = "/uploads/1700000000-spot.mp4".to_string();
        assert_eq!(ad.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_click_through() {
        let mut ad = ad("a", SlotType::Preroll, SkipCategory::Bumper, 6.0);
        ad.link_url = Some("javascript:void(0)".to_string());
        assert!(matches!(ad.validate(), Err(InvalidAd::LinkUrl(_))));
    }
}
