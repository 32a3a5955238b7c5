// SPDX-License-Identifier: Apache-2.0

use adops_core::RecordId;
use serde::{Deserialize, Serialize};

use crate::registry::{FieldRegistry, HasFields, RegistryError, Tabular};
use crate::value::{FieldKind, FieldRead};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
    Draft,
}

impl CampaignStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Draft => "Draft",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: RecordId,
    pub name: String,
    pub advertiser: String,
    pub publisher: String,
    pub status: CampaignStatus,
    pub budget: f64,
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub programmatic: bool,
}

impl Campaign {
    /// Click-through rate in percent.
    #[must_use]
    pub fn ctr(&self) -> FieldRead {
        FieldRead::percentage(self.clicks as f64, self.impressions as f64)
    }

    #[must_use]
    pub fn utilization(&self) -> FieldRead {
        FieldRead::percentage(self.spent, self.budget)
    }
}

impl Tabular for Campaign {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl HasFields for Campaign {
    const SCREEN: &'static str = "campaigns";

    fn field_registry() -> Result<FieldRegistry<Self>, RegistryError> {
        FieldRegistry::builder()
            .field("id", FieldKind::Text, |c: &Self| FieldRead::text(c.id.as_str()))
            .searchable()
            .field("name", FieldKind::Text, |c: &Self| FieldRead::text(&c.name))
            .searchable()
            .field("advertiser", FieldKind::Text, |c: &Self| {
                FieldRead::text(&c.advertiser)
            })
            .searchable()
            .field("publisher", FieldKind::Category, |c: &Self| {
                FieldRead::category(&c.publisher)
            })
            .field("status", FieldKind::Category, |c: &Self| {
                FieldRead::category(c.status.as_str())
            })
            .field("budget", FieldKind::Number, |c: &Self| FieldRead::number(c.budget))
            .field("spent", FieldKind::Number, |c: &Self| FieldRead::number(c.spent))
            .field("impressions", FieldKind::Number, |c: &Self| {
                FieldRead::count(c.impressions)
            })
            .field("clicks", FieldKind::Number, |c: &Self| FieldRead::count(c.clicks))
            .field("ctr", FieldKind::Number, Self::ctr)
            .field("utilization", FieldKind::Number, Self::utilization)
            .field("start_date", FieldKind::Date, |c: &Self| FieldRead::date(&c.start_date))
            .field("end_date", FieldKind::Date, |c: &Self| FieldRead::date(&c.end_date))
            .field("programmatic", FieldKind::Bool, |c: &Self| {
                FieldRead::boolean(c.programmatic)
            })
            .build()
    }
}
