use adops_core::RecordId;
use serde::{Deserialize, Serialize};

use crate::registry::{FieldRegistry, HasFields, RegistryError, Tabular};
use crate::value::{FieldKind, FieldRead};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Under Delivering")]
    UnderDelivering,
    #[serde(rename = "Over Delivering")]
    OverDelivering,
    Completed,
}

impl DeliveryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::UnderDelivering => "Under Delivering",
            Self::OverDelivering => "Over Delivering",
            Self::Completed => "Completed",
        }
    }
}

/// One line of the ad-ops delivery report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLine {
    pub id: RecordId,
    pub campaign: String,
    pub publisher: String,
    pub ad_format: String,
    pub booked_impressions: u64,
    #[serde(default)]
    pub delivered_impressions: u64,
    #[serde(default)]
    pub revenue: f64,
    pub delivery_date: String,
    pub status: DeliveryStatus,
}

impl DeliveryLine {
    #[must_use]
    pub fn pacing(&self) -> FieldRead {
        FieldRead::percentage(
            self.delivered_impressions as f64,
            self.booked_impressions as f64,
        )
    }
}

impl Tabular for DeliveryLine {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl HasFields for DeliveryLine {
    const SCREEN: &'static str = "adops";

    fn field_registry() -> Result<FieldRegistry<Self>, RegistryError> {
        FieldRegistry::builder()
            .field("id", FieldKind::Text, |d: &Self| FieldRead::text(d.id.as_str()))
            .field("campaign", FieldKind::Text, |d: &Self| FieldRead::text(&d.campaign))
            .searchable()
            .field("publisher", FieldKind::Category, |d: &Self| {
                FieldRead::category(&d.publisher)
            })
            .searchable()
            .field("ad_format", FieldKind::Category, |d: &Self| {
                FieldRead::category(&d.ad_format)
            })
            .field("booked_impressions", FieldKind::Number, |d: &Self| {
                FieldRead::count(d.booked_impressions)
            })
            .field("delivered_impressions", FieldKind::Number, |d: &Self| {
                FieldRead::count(d.delivered_impressions)
            })
            .field("revenue", FieldKind::Number, |d: &Self| FieldRead::number(d.revenue))
            .field("pacing", FieldKind::Number, Self::pacing)
            .field("delivery_date", FieldKind::Date, |d: &Self| {
                FieldRead::date(&d.delivery_date)
            })
            .field("status", FieldKind::Category, |d: &Self| {
                FieldRead::category(d.status.as_str())
            })
            .build()
    }
}
