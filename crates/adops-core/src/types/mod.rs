mod ids;

pub use ids::{FieldName, RecordId, FIELD_NAME_MAX_LEN, RECORD_ID_MAX_LEN};
