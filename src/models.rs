use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// Client gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "MALE" => Some(Gender::Male),
            "FEMALE" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Gender constraint on campaign targeting; `All` matches every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetGender {
    Male,
    Female,
    All,
}

impl TargetGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetGender::Male => "MALE",
            TargetGender::Female => "FEMALE",
            TargetGender::All => "ALL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "MALE" => Some(TargetGender::Male),
            "FEMALE" => Some(TargetGender::Female),
            "ALL" => Some(TargetGender::All),
            _ => None,
        }
    }

    pub fn includes(&self, gender: Gender) -> bool {
        match self {
            TargetGender::All => true,
            TargetGender::Male => gender == Gender::Male,
            TargetGender::Female => gender == Gender::Female,
        }
    }
}

/// Campaign audience constraints. An absent dimension means "no constraint",
/// which is distinct from any concrete value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<TargetGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_to: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Targeting {
    pub fn validate(&self) -> Result<(), EngineError> {
        for bound in [self.age_from, self.age_to].into_iter().flatten() {
            if bound <= 0 || bound >= 200 {
                return Err(EngineError::bad_request(
                    "targeting age bounds must be greater than 0 and less than 200",
                ));
            }
        }
        if let (Some(from), Some(to)) = (self.age_from, self.age_to) {
            if from > to {
                return Err(EngineError::bad_request(
                    "targeting age_from cannot exceed age_to",
                ));
            }
        }
        Ok(())
    }
}

/// End user ads are served to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "client_id")]
    pub id: Uuid,
    pub login: String,
    pub age: i64,
    pub location: String,
    pub gender: Gender,
}

impl Client {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.age <= 0 || self.age >= 200 {
            return Err(EngineError::bad_request(
                "client age must be greater than 0 and less than 200",
            ));
        }
        Ok(())
    }
}

/// Campaign owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertiser {
    #[serde(rename = "advertiser_id")]
    pub id: Uuid,
    pub name: String,
}

/// Relevance of an advertiser to a client, used only to rank eligible ads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlScore {
    pub client_id: Uuid,
    pub advertiser_id: Uuid,
    pub score: i64,
}

/// Requested campaign fields, as sent on create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub impressions_limit: i64,
    pub clicks_limit: i64,
    pub cost_per_impression: f64,
    pub cost_per_click: f64,
    pub ad_title: String,
    pub ad_text: String,
    pub start_day: i64,
    pub end_day: i64,
    #[serde(default)]
    pub targeting: Targeting,
}

impl CampaignDraft {
    /// Field-level validation. Date-window rules need the current day and are
    /// checked by the campaign service against the clock.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.impressions_limit < 0 {
            return Err(EngineError::bad_request("impressions_limit cannot be negative"));
        }
        if self.clicks_limit < 0 {
            return Err(EngineError::bad_request("clicks_limit cannot be negative"));
        }
        if self.cost_per_impression < 0.0 {
            return Err(EngineError::bad_request("cost_per_impression cannot be negative"));
        }
        if self.cost_per_click < 0.0 {
            return Err(EngineError::bad_request("cost_per_click cannot be negative"));
        }
        if self.start_day < 0 || self.end_day < 0 {
            return Err(EngineError::bad_request("campaign days cannot be negative"));
        }
        self.targeting.validate()
    }
}

/// A stored campaign together with its targeting row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(rename = "campaign_id")]
    pub id: Uuid,
    pub advertiser_id: Uuid,
    pub impressions_limit: i64,
    pub clicks_limit: i64,
    pub cost_per_impression: f64,
    pub cost_per_click: f64,
    pub ad_title: String,
    pub ad_text: String,
    pub start_day: i64,
    pub end_day: i64,
    pub targeting: Targeting,
}

impl Campaign {
    pub fn from_draft(id: Uuid, advertiser_id: Uuid, draft: CampaignDraft) -> Self {
        Self {
            id,
            advertiser_id,
            impressions_limit: draft.impressions_limit,
            clicks_limit: draft.clicks_limit,
            cost_per_impression: draft.cost_per_impression,
            cost_per_click: draft.cost_per_click,
            ad_title: draft.ad_title,
            ad_text: draft.ad_text,
            start_day: draft.start_day,
            end_day: draft.end_day,
            targeting: draft.targeting,
        }
    }

    /// Once a campaign has started, limits and the date window are frozen.
    pub fn has_started(&self, today: i64) -> bool {
        self.start_day <= today
    }

    pub fn window_contains(&self, day: i64) -> bool {
        self.start_day <= day && day <= self.end_day
    }
}

/// Ad returned to a client by the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServedAd {
    pub ad_id: Uuid,
    pub ad_title: String,
    pub ad_text: String,
    pub advertiser_id: Uuid,
}

impl ServedAd {
    pub fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            ad_id: campaign.id,
            ad_title: campaign.ad_title.clone(),
            ad_text: campaign.ad_text.clone(),
            advertiser_id: campaign.advertiser_id,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub moderation_blocklist: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./adserve.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let moderation_blocklist = std::env::var("MODERATION_BLOCKLIST")
            .unwrap_or_else(|_| {
                "free money,guaranteed win,miracle cure,get rich quick".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_path,
            port,
            request_timeout_secs,
            moderation_blocklist,
        })
    }
}
