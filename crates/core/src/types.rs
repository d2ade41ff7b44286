/// Form identifiers as assigned by the form platform.
pub type FormId = i64;

/// Field identifiers, normalised to their trimmed decimal string form.
pub type FieldId = String;
