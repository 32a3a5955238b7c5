// SPDX-License-Identifier: Apache-2.0

use adops_core::RecordId;
use serde::{Deserialize, Serialize};

use crate::approval::{ensure_pending, rejection_reason, ApprovalStatus, TransitionError};
use crate::registry::{FieldRegistry, HasFields, RegistryError, Tabular};
use crate::value::{FieldKind, FieldRead};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationType {
    Advertiser,
    Agency,
    Publisher,
}

impl OrganizationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advertiser => "Advertiser",
            Self::Agency => "Agency",
            Self::Publisher => "Publisher",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: RecordId,
    pub name: String,
    pub org_type: OrganizationType,
    pub country: String,
    pub contact_email: String,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub documents_verified: bool,
    pub registered_at: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl Organization {
    /// Approval marks the submitted documents as verified.
    pub fn approve(&self) -> Result<Self, TransitionError> {
        ensure_pending(self.id.as_str(), self.status)?;
        Ok(Self {
            status: ApprovalStatus::Approved,
            documents_verified: true,
            rejection_reason: None,
            ..self.clone()
        })
    }

    pub fn reject(&self, reason: &str) -> Result<Self, TransitionError> {
        ensure_pending(self.id.as_str(), self.status)?;
        let reason = rejection_reason(self.id.as_str(), reason)?;
        Ok(Self {
            status: ApprovalStatus::Rejected,
            rejection_reason: Some(reason),
            ..self.clone()
        })
    }
}

impl Tabular for Organization {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl HasFields for Organization {
    const SCREEN: &'static str = "organizations";

    fn field_registry() -> Result<FieldRegistry<Self>, RegistryError> {
        FieldRegistry::builder()
            .field("id", FieldKind::Text, |o: &Self| FieldRead::text(o.id.as_str()))
            .field("name", FieldKind::Text, |o: &Self| FieldRead::text(&o.name))
            .searchable()
            .field("org_type", FieldKind::Category, |o: &Self| {
                FieldRead::category(o.org_type.as_str())
            })
            .field("country", FieldKind::Category, |o: &Self| {
                FieldRead::category(&o.country)
            })
            .field("contact_email", FieldKind::Text, |o: &Self| {
                FieldRead::text(&o.contact_email)
            })
            .searchable()
            .field("status", FieldKind::Category, |o: &Self| {
                FieldRead::category(o.status.as_str())
            })
            .field("documents_verified", FieldKind::Bool, |o: &Self| {
                FieldRead::boolean(o.documents_verified)
            })
            .field("registered_at", FieldKind::Date, |o: &Self| {
                FieldRead::date(&o.registered_at)
            })
            .field("rejection_reason", FieldKind::Text, |o: &Self| {
                FieldRead::optional_text(o.rejection_reason.as_deref())
            })
            .build()
    }
}
