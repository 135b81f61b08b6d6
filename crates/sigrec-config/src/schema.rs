use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::ReconcileConfig;

/// JSON schema for `sigrec.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(ReconcileConfig);
    schema.schema.metadata().title = Some("sigrec.toml".to_owned());
    schema
}
