use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// REST DTO for one employee row. `full_name` is computed, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub emp_no: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub gender: String,
    /// ISO-8601 date.
    pub hire_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// Row shape produced by the listing pipeline (snake_case column names).
#[derive(Debug, Deserialize)]
struct EmployeeRow {
    emp_no: i32,
    first_name: String,
    last_name: String,
    gender: String,
    hire_date: String,
    #[serde(default)]
    birth_date: Option<String>,
}

impl From<EmployeeRow> for EmployeeDto {
    fn from(row: EmployeeRow) -> Self {
        Self {
            full_name: format!("{} {}", row.first_name, row.last_name),
            emp_no: row.emp_no,
            first_name: row.first_name,
            last_name: row.last_name,
            gender: row.gender,
            hire_date: row.hire_date,
            birth_date: row.birth_date,
        }
    }
}

impl EmployeeDto {
    /// Output fields requested from the pipeline; `full_name` is not a column.
    pub const FIELDS: [&'static str; 7] = [
        "emp_no",
        "first_name",
        "last_name",
        "full_name",
        "gender",
        "hire_date",
        "birth_date",
    ];

    pub fn from_row(row: JsonValue) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<EmployeeRow>(row).map(Self::from)
    }
}
