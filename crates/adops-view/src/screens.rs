//! Built-in list screens and the query each one opens with.

use std::fmt;
use std::str::FromStr;

use adops_model::{Campaign, DeliveryLine, HasFields, Organization, ReportTemplate, UpdateRequest};
use adops_query::{AggregateSpec, FilterSpec, Operand, SortSpec, ViewQuery};
use serde::Serialize;

use crate::error::ViewError;

/// A screen record type together with its stat cards and default order.
pub trait ScreenPreset: HasFields {
    fn default_query() -> ViewQuery;
}

fn count_status(name: &str, status: &str) -> AggregateSpec {
    AggregateSpec::count(name).with_predicate(FilterSpec::equals("status", Some(status)))
}

impl ScreenPreset for Campaign {
    fn default_query() -> ViewQuery {
        ViewQuery::new()
            .with_sort(SortSpec::desc("id"))
            .with_aggregate(AggregateSpec::count("total"))
            .with_aggregate(count_status("active", "Active"))
            .with_aggregate(AggregateSpec::sum("total_budget", "budget"))
            .with_aggregate(AggregateSpec::sum("total_spent", "spent"))
            .with_aggregate(AggregateSpec::average("avg_ctr", "ctr"))
            .with_aggregate(AggregateSpec::percentage_of(
                "budget_utilization",
                Operand::sum("spent"),
                Operand::sum("budget"),
            ))
    }
}

impl ScreenPreset for DeliveryLine {
    fn default_query() -> ViewQuery {
        ViewQuery::new()
            .with_sort(SortSpec::desc("id"))
            .with_aggregate(AggregateSpec::sum("booked_impressions", "booked_impressions"))
            .with_aggregate(AggregateSpec::sum(
                "delivered_impressions",
                "delivered_impressions",
            ))
            .with_aggregate(AggregateSpec::sum("revenue", "revenue"))
            .with_aggregate(AggregateSpec::percentage_of(
                "delivery_rate",
                Operand::sum("delivered_impressions"),
                Operand::sum("booked_impressions"),
            ))
            .with_aggregate(count_status("under_delivering", "Under Delivering"))
    }
}

impl ScreenPreset for UpdateRequest {
    fn default_query() -> ViewQuery {
        ViewQuery::new()
            .with_sort(SortSpec::desc("id"))
            .with_aggregate(AggregateSpec::count("total"))
            .with_aggregate(count_status("pending", "Pending"))
            .with_aggregate(count_status("approved", "Approved"))
            .with_aggregate(count_status("rejected", "Rejected"))
            .with_aggregate(
                AggregateSpec::count("urgent")
                    .with_predicate(FilterSpec::toggle("urgent", Some(true))),
            )
    }
}

impl ScreenPreset for Organization {
    fn default_query() -> ViewQuery {
        ViewQuery::new()
            .with_sort(SortSpec::desc("id"))
            .with_aggregate(AggregateSpec::count("total"))
            .with_aggregate(count_status("pending", "Pending"))
            .with_aggregate(count_status("approved", "Approved"))
            .with_aggregate(AggregateSpec::percentage_of(
                "verified_share",
                Operand::count_where(FilterSpec::toggle("documents_verified", Some(true))),
                Operand::count(),
            ))
    }
}

impl ScreenPreset for ReportTemplate {
    fn default_query() -> ViewQuery {
        ViewQuery::new()
            .with_sort(SortSpec::desc("id"))
            .with_aggregate(AggregateSpec::count("total"))
            .with_aggregate(
                AggregateSpec::count("scheduled")
                    .with_predicate(FilterSpec::toggle("scheduled", Some(true))),
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Campaigns,
    Delivery,
    UpdateRequests,
    Organizations,
    Reports,
}

impl ScreenKind {
    pub const ALL: [Self; 5] = [
        Self::Campaigns,
        Self::Delivery,
        Self::UpdateRequests,
        Self::Organizations,
        Self::Reports,
    ];

    /// The screen key used in logs and export names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Campaigns => Campaign::SCREEN,
            Self::Delivery => DeliveryLine::SCREEN,
            Self::UpdateRequests => UpdateRequest::SCREEN,
            Self::Organizations => Organization::SCREEN,
            Self::Reports => ReportTemplate::SCREEN,
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "campaigns" | "campaign" => Ok(Self::Campaigns),
            "adops" | "delivery" => Ok(Self::Delivery),
            "hur" | "update-requests" | "update_requests" => Ok(Self::UpdateRequests),
            "organizations" | "orgs" => Ok(Self::Organizations),
            "reports" => Ok(Self::Reports),
            other => Err(ViewError::validation(format!(
                "unknown screen `{other}`; expected one of campaigns, adops, hur, organizations, reports"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub kind: &'static str,
    pub searchable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenInfo {
    pub screen: &'static str,
    pub default_sort: Option<String>,
    pub aggregates: Vec<String>,
    pub fields: Vec<FieldInfo>,
}

fn describe<R: ScreenPreset>() -> Result<ScreenInfo, ViewError> {
    let registry = R::field_registry().map_err(|err| ViewError::validation(err.to_string()))?;
    let query = R::default_query();
    Ok(ScreenInfo {
        screen: R::SCREEN,
        default_sort: query.sort.as_ref().map(ToString::to_string),
        aggregates: query.aggregates.iter().map(|a| a.name.clone()).collect(),
        fields: registry
            .fields()
            .map(|d| FieldInfo {
                name: d.name().to_string(),
                kind: d.kind().as_str(),
                searchable: d.searchable(),
            })
            .collect(),
    })
}

impl ScreenKind {
    pub fn info(self) -> Result<ScreenInfo, ViewError> {
        match self {
            Self::Campaigns => describe::<Campaign>(),
            Self::Delivery => describe::<DeliveryLine>(),
            Self::UpdateRequests => describe::<UpdateRequest>(),
            Self::Organizations => describe::<Organization>(),
            Self::Reports => describe::<ReportTemplate>(),
        }
    }
}

pub fn screen_catalog() -> Result<Vec<ScreenInfo>, ViewError> {
    ScreenKind::ALL.iter().map(|kind| kind.info()).collect()
}
