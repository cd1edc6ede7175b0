// Record store: employers and vacancies in SQLite, plus the fixed set of
// analytical queries the menu offers. One connection is opened when the
// store is built and released by `close`.

use std::fs;
use std::path::Path;

use log::{debug, error, info};
use rusqlite::{params, Connection, Row};
use serde_json::Value;

use crate::error::StoreError;
use crate::models::{as_amount, record_id};

/// Drops and recreates both tables. Destroys any previous data.
const SCHEMA: &str = "
    DROP TABLE IF EXISTS vacancies;
    DROP TABLE IF EXISTS employers;

    CREATE TABLE employers (
        employer_id INTEGER PRIMARY KEY,
        name        TEXT NOT NULL,
        url         TEXT
    );

    CREATE TABLE vacancies (
        vacancy_id  INTEGER PRIMARY KEY AUTOINCREMENT,
        employer_id INTEGER NOT NULL REFERENCES employers(employer_id),
        title       TEXT NOT NULL,
        salary_from INTEGER,
        salary_to   INTEGER,
        currency    TEXT,
        url         TEXT,
        description TEXT,
        city        TEXT
    );
";

/// `(employer_name, vacancy_count)`
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyCount {
    pub name: String,
    pub vacancies: i64,
}

/// One row of the full vacancy listing.
#[derive(Debug, Clone, PartialEq)]
pub struct VacancyListing {
    pub employer_name: String,
    pub title: String,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub currency: Option<String>,
    pub url: String,
}

/// Vacancy row returned by the filtered queries (no currency column).
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryMatch {
    pub employer_name: String,
    pub title: String,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub url: String,
}

/// Columns of a vacancy row as extracted from a raw API record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VacancyFields {
    pub title: String,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub currency: Option<String>,
    pub url: String,
    pub description: String,
    pub city: String,
}

impl VacancyFields {
    /// A missing or null `salary` leaves all three salary columns empty;
    /// a missing `area` gives an empty city. Search results carry no
    /// `description`, so the snippet's responsibility text stands in for it.
    pub fn from_record(record: &Value) -> Self {
        let salary = record.get("salary").filter(|s| s.is_object());
        let description = text(record.get("description"))
            .or_else(|| text(record.pointer("/snippet/responsibility")))
            .unwrap_or_default();

        VacancyFields {
            title: text(record.get("name")).unwrap_or_default(),
            salary_from: as_amount(salary.and_then(|s| s.get("from"))),
            salary_to: as_amount(salary.and_then(|s| s.get("to"))),
            currency: text(salary.and_then(|s| s.get("currency"))),
            url: text(record.get("alternate_url")).unwrap_or_default(),
            description,
            city: text(record.pointer("/area/name")).unwrap_or_default(),
        }
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if absent) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!("Opened database {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        // SQLite leaves foreign keys off unless asked, per connection.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Store { conn })
    }

    /// Release the connection.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::from(e))
    }

    pub fn create_tables(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA).map_err(|e| {
            error!("Failed to create tables: {}", e);
            StoreError::from(e)
        })?;
        info!("Tables employers and vacancies recreated");
        Ok(())
    }

    /// Insert an employer (`id`, `name`, `alternate_url`). An id that is
    /// already stored is left untouched. Returns the employer id.
    pub fn save_employer(&self, employer: &Value) -> Result<i64, StoreError> {
        let id = record_id(employer.get("id")).ok_or(StoreError::MissingField("id"))?;
        let name = employer
            .get("name")
            .and_then(Value::as_str)
            .ok_or(StoreError::MissingField("name"))?;
        let url = employer.get("alternate_url").and_then(Value::as_str);

        let inserted = self.conn.execute(
            "INSERT INTO employers (employer_id, name, url)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (employer_id) DO NOTHING",
            params![id, name, url],
        )?;
        if inserted == 0 {
            debug!("Employer {} already stored, skipped", id);
        }
        Ok(id)
    }

    /// Insert a vacancy for `employer_id`, which must already be stored.
    /// Returns the new vacancy id.
    pub fn save_vacancy(&self, vacancy: &Value, employer_id: i64) -> Result<i64, StoreError> {
        let v = VacancyFields::from_record(vacancy);
        self.conn
            .execute(
                "INSERT INTO vacancies
                    (employer_id, title, salary_from, salary_to, currency, url, description, city)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    employer_id,
                    v.title,
                    v.salary_from,
                    v.salary_to,
                    v.currency,
                    v.url,
                    v.description,
                    v.city
                ],
            )
            .map_err(|e| referential_or(e, employer_id))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every employer with its number of vacancies, most vacancies first.
    pub fn companies_and_vacancy_counts(&self) -> Result<Vec<CompanyCount>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT e.name, COUNT(v.vacancy_id) AS vacancy_count
             FROM employers e
             LEFT JOIN vacancies v ON e.employer_id = v.employer_id
             GROUP BY e.name
             ORDER BY vacancy_count DESC, e.name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CompanyCount {
                    name: row.get(0)?,
                    vacancies: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    }

    pub fn all_vacancies(&self) -> Result<Vec<VacancyListing>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT e.name, v.title, v.salary_from, v.salary_to, v.currency, v.url
             FROM vacancies v
             JOIN employers e ON v.employer_id = e.employer_id
             ORDER BY v.vacancy_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(VacancyListing {
                    employer_name: row.get(0)?,
                    title: row.get(1)?,
                    salary_from: row.get(2)?,
                    salary_to: row.get(3)?,
                    currency: row.get(4)?,
                    url: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    }

    /// Mean of the salary midpoints of vacancies that disclose at least one
    /// bound, rounded to two places. A single bound is its own midpoint.
    /// `0.0` when no vacancy discloses a salary.
    pub fn average_salary(&self) -> Result<f64, StoreError> {
        let avg: Option<f64> = self.conn.query_row(
            "SELECT AVG((COALESCE(salary_from, salary_to) + COALESCE(salary_to, salary_from)) / 2.0)
             FROM vacancies
             WHERE salary_from IS NOT NULL OR salary_to IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(avg.map(round2).unwrap_or(0.0))
    }

    /// Vacancies whose lower bound (or upper, when there is no lower) beats
    /// the current average salary.
    pub fn vacancies_above_average_salary(&self) -> Result<Vec<SalaryMatch>, StoreError> {
        let avg = self.average_salary()?;
        let mut stmt = self.conn.prepare(
            "SELECT e.name, v.title, v.salary_from, v.salary_to, v.url
             FROM vacancies v
             JOIN employers e ON v.employer_id = e.employer_id
             WHERE COALESCE(v.salary_from, v.salary_to) > ?1
             ORDER BY v.vacancy_id",
        )?;
        let rows = stmt
            .query_map(params![avg], salary_match)?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    }

    /// Vacancies whose title contains `keyword`, ignoring case. The match
    /// runs in Rust because SQLite's LOWER only folds ASCII.
    pub fn vacancies_matching_keyword(&self, keyword: &str) -> Result<Vec<SalaryMatch>, StoreError> {
        let needle = keyword.to_lowercase();
        let mut stmt = self.conn.prepare(
            "SELECT e.name, v.title, v.salary_from, v.salary_to, v.url
             FROM vacancies v
             JOIN employers e ON v.employer_id = e.employer_id
             ORDER BY v.vacancy_id",
        )?;
        let rows = stmt
            .query_map([], salary_match)?
            .filter(|r| match r {
                Ok(m) => m.title.to_lowercase().contains(&needle),
                Err(_) => true,
            })
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    }
}

fn salary_match(row: &Row) -> rusqlite::Result<SalaryMatch> {
    Ok(SalaryMatch {
        employer_name: row.get(0)?,
        title: row.get(1)?,
        salary_from: row.get(2)?,
        salary_to: row.get(3)?,
        url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

fn referential_or(e: rusqlite::Error, employer_id: i64) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            StoreError::Referential { employer_id }
        }
        _ => StoreError::Sql(e),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
