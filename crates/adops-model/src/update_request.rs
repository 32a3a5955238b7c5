// SPDX-License-Identifier: Apache-2.0

use adops_core::RecordId;
use serde::{Deserialize, Serialize};

use crate::approval::{ensure_pending, rejection_reason, ApprovalStatus, TransitionError};
use crate::registry::{FieldRegistry, HasFields, RegistryError, Tabular};
use crate::value::{FieldKind, FieldRead};

/// Historical update request (HUR): a request to change a value on a
/// campaign after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub id: RecordId,
    pub campaign_id: String,
    pub requested_by: String,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    #[serde(default)]
    pub reason: String,
    pub status: ApprovalStatus,
    pub submitted_at: String,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub decision_note: Option<String>,
}

impl UpdateRequest {
    pub fn approve(&self) -> Result<Self, TransitionError> {
        ensure_pending(self.id.as_str(), self.status)?;
        Ok(Self {
            status: ApprovalStatus::Approved,
            decision_note: None,
            ..self.clone()
        })
    }

    pub fn reject(&self, reason: &str) -> Result<Self, TransitionError> {
        ensure_pending(self.id.as_str(), self.status)?;
        let note = rejection_reason(self.id.as_str(), reason)?;
        Ok(Self {
            status: ApprovalStatus::Rejected,
            decision_note: Some(note),
            ..self.clone()
        })
    }
}

impl Tabular for UpdateRequest {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl HasFields for UpdateRequest {
    const SCREEN: &'static str = "hur";

    fn field_registry() -> Result<FieldRegistry<Self>, RegistryError> {
        FieldRegistry::builder()
            .field("id", FieldKind::Text, |u: &Self| FieldRead::text(u.id.as_str()))
            .searchable()
            .field("campaign_id", FieldKind::Text, |u: &Self| {
                FieldRead::text(&u.campaign_id)
            })
            .searchable()
            .field("requested_by", FieldKind::Text, |u: &Self| {
                FieldRead::text(&u.requested_by)
            })
            .searchable()
            .field("field", FieldKind::Category, |u: &Self| FieldRead::category(&u.field))
            .field("old_value", FieldKind::Text, |u: &Self| FieldRead::text(&u.old_value))
            .field("new_value", FieldKind::Text, |u: &Self| FieldRead::text(&u.new_value))
            .field("reason", FieldKind::Text, |u: &Self| FieldRead::text(&u.reason))
            .searchable()
            .field("status", FieldKind::Category, |u: &Self| {
                FieldRead::category(u.status.as_str())
            })
            .field("submitted_at", FieldKind::Date, |u: &Self| {
                FieldRead::date(&u.submitted_at)
            })
            .field("urgent", FieldKind::Bool, |u: &Self| FieldRead::boolean(u.urgent))
            .build()
    }
}
