//! Record extractor: typed navigation of a decoded index document.
//!
//! The source schema is fixed: `reporting_entity_name` names the
//! organization, the first reporting structure's first plan supplies the
//! identifier and plan name, and that structure's `in_network_files`
//! entries supply the rate-file URLs in document order. Every missing or
//! malformed step fails with a schema error naming the offending path.

use serde_json::Value;

use planindex_shared::{IdentifierRecord, NameRecord, PlanIndexError, Result};

/// The values one document contributes to the indexes.
///
/// The identifier-index key is the [`NameRecord`]'s `plan_id`; the
/// [`IdentifierRecord`] body does not repeat it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecords {
    /// The organization that published the document.
    pub organization: String,
    /// The plan from the organization's point of view.
    pub name_record: NameRecord,
    /// The plan from the identifier's point of view.
    pub identifier_record: IdentifierRecord,
}

impl ExtractedRecords {
    /// The identifier-index key for this document's plan.
    pub fn identifier(&self) -> &str {
        &self.name_record.plan_id
    }
}

/// Extract the two index records from a decoded index document.
pub fn extract_records(doc: &Value) -> Result<ExtractedRecords> {
    let organization = required_string(doc, "reporting_entity_name")?;

    let structure = first_entry(doc, "reporting_structure")?;
    let plan = first_entry(structure, "reporting_plans")?;

    let plan_id = plan_identifier(plan)?;
    let plan_name = required_string(plan, "plan_name")?;
    let urls = file_locations(structure)?;

    let name_record = NameRecord {
        plan_name: plan_name.clone(),
        plan_id,
        urls: urls.clone(),
    };
    let identifier_record = IdentifierRecord {
        company_name: organization.clone(),
        plan_name,
        urls,
    };

    Ok(ExtractedRecords {
        organization,
        name_record,
        identifier_record,
    })
}

/// Read a required string field directly under `value`.
fn required_string(value: &Value, field: &'static str) -> Result<String> {
    match value.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(PlanIndexError::schema(field, "expected a string")),
        None => Err(PlanIndexError::schema(field, "missing field")),
    }
}

/// Read the first entry of a required array field.
fn first_entry<'a>(value: &'a Value, field: &'static str) -> Result<&'a Value> {
    let entries = match value.get(field) {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(PlanIndexError::schema(field, "expected an array")),
        None => return Err(PlanIndexError::schema(field, "missing field")),
    };

    entries
        .first()
        .ok_or_else(|| PlanIndexError::schema(field, "no entries"))
}

/// Read the plan identifier, normalizing JSON numbers to strings.
///
/// Source documents carry `plan_id` as either a string or a bare number;
/// both are accepted.
fn plan_identifier(plan: &Value) -> Result<String> {
    match plan.get("plan_id") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(PlanIndexError::schema(
            "reporting_plans[0].plan_id",
            "expected a string or number",
        )),
        None => Err(PlanIndexError::schema(
            "reporting_plans[0].plan_id",
            "missing field",
        )),
    }
}

/// Collect each `in_network_files` entry's `location`, preserving order.
///
/// An empty file list is valid (the aggregator skips such records); a
/// missing list or an entry without a string `location` is not.
fn file_locations(structure: &Value) -> Result<Vec<String>> {
    let files = match structure.get("in_network_files") {
        Some(Value::Array(files)) => files,
        Some(_) => {
            return Err(PlanIndexError::schema(
                "in_network_files",
                "expected an array",
            ));
        }
        None => return Err(PlanIndexError::schema("in_network_files", "missing field")),
    };

    let mut urls = Vec::with_capacity(files.len());
    for (i, file) in files.iter().enumerate() {
        match file.get("location") {
            Some(Value::String(location)) => urls.push(location.clone()),
            _ => {
                return Err(PlanIndexError::schema(
                    format!("in_network_files[{i}].location"),
                    "missing or not a string",
                ));
            }
        }
    }

    Ok(urls)
}
