// Typed views over the raw API records. The API returns loosely-typed JSON;
// these structs pick out the handful of fields the menu shows and give the
// saved vacancies a salary to sort by.

use serde_json::Value;
use std::cmp::Ordering;

/// Label shown instead of a missing or zero salary.
pub const SALARY_NOT_DISCLOSED: &str = "salary not disclosed";

/// Read an id that the API may send either as a number or as a numeric string.
pub fn record_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer view of a JSON number; fractional amounts are truncated.
pub fn as_amount(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vacancy {
    pub name: String,
    pub url: String,
    /// Lower salary bound, else upper bound, else 0.
    pub salary: i64,
    pub employer_name: String,
}

impl Vacancy {
    pub fn from_record(record: &Value) -> Self {
        let employer = record.get("employer");
        Vacancy {
            name: str_field(record, "name"),
            url: str_field(record, "url"),
            salary: pick_salary(record.get("salary")),
            employer_name: employer.map(|e| str_field(e, "name")).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Employer {
    pub id: Option<i64>,
    pub name: String,
    pub url: String,
    pub description: String,
}

impl Employer {
    pub fn from_record(record: &Value) -> Self {
        Employer {
            id: record_id(record.get("id")),
            name: str_field(record, "name"),
            url: str_field(record, "url"),
            description: str_field(record, "description"),
        }
    }
}

/// Text for a salary figure, or [`SALARY_NOT_DISCLOSED`] for none / non-positive.
pub fn salary_label(salary: Option<i64>) -> String {
    match salary {
        Some(s) if s > 0 => s.to_string(),
        _ => SALARY_NOT_DISCLOSED.to_string(),
    }
}

/// Orders vacancies by salary, lowest first.
pub fn by_salary(a: &Vacancy, b: &Vacancy) -> Ordering {
    a.salary.cmp(&b.salary)
}

fn pick_salary(salary: Option<&Value>) -> i64 {
    let Some(salary) = salary.filter(|s| s.is_object()) else {
        return 0;
    };
    [salary.get("from"), salary.get("to")]
        .into_iter()
        .filter_map(as_amount)
        .find(|s| *s != 0)
        .unwrap_or(0)
}

fn str_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
