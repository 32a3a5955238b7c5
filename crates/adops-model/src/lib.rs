#![forbid(unsafe_code)]
//! Typed records of the ad-ops list screens and their declared field
//! registries.

mod approval;
mod campaign;
mod delivery;
mod dynamic;
mod organization;
mod registry;
mod report;
mod update_request;
mod value;

pub use approval::{ApprovalStatus, TransitionError};
pub use campaign::{Campaign, CampaignStatus};
pub use delivery::{DeliveryLine, DeliveryStatus};
pub use dynamic::{DynRecord, RecordSchema, SchemaField};
pub use organization::{Organization, OrganizationType};
pub use registry::{
    FieldDescriptor, FieldRegistry, Getter, HasFields, RegistryBuilder, RegistryError, Tabular,
};
pub use report::{ExportFormat, ReportTemplate};
pub use update_request::UpdateRequest;
pub use value::{format_number, parse_date, FieldKind, FieldRead, FieldValue};

pub const CRATE_NAME: &str = "adops-model";
