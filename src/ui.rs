// UI layer: the interactive menu built on `dialoguer`. Each entry is a
// small synchronous function that talks to the job board, the JSON files
// or the record store and prints the result.

use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde_json::Value;

use crate::api::{JobBoard, SearchQuery};
use crate::config::Settings;
use crate::db::Store;
use crate::files::{JsonFile, RecordFile};
use crate::models::{by_salary, record_id, salary_label, Employer, Vacancy};

/// Companies loaded into the database by the "load companies" entry.
pub const COMPANIES: [&str; 10] = [
    "Яндекс",
    "Газпром",
    "Сбербанк",
    "Ростелеком",
    "Лукойл",
    "Норникель",
    "Авито",
    "Ozon",
    "Mail.ru",
    "Тинькофф",
];

const MENU: [&str; 12] = [
    "Search vacancies (save to JSON)",
    "Search employer (save to JSON)",
    "Show saved vacancies (JSON)",
    "Load companies into the database",
    "Companies and vacancy counts",
    "All vacancies",
    "Average salary",
    "Vacancies above average salary",
    "Search vacancies by keyword",
    "Delete saved vacancy (JSON)",
    "Show saved employers (JSON)",
    "Exit",
];

/// Main interactive loop. Runs until the user picks "Exit", then closes
/// the store.
pub fn main_menu(api: &dyn JobBoard, store: Store, settings: &Settings) -> Result<()> {
    loop {
        println!();
        let selection = Select::new()
            .with_prompt("Choose an action")
            .items(&MENU)
            .default(0)
            .interact()?;

        let outcome = match selection {
            0 => search_vacancies_to_file(api, settings),
            1 => search_employer_to_file(api, settings),
            2 => show_saved_vacancies(settings),
            3 => load_companies_with_progress(api, &store, settings),
            4 => print_company_counts(&store),
            5 => print_all_vacancies(&store),
            6 => print_average_salary(&store),
            7 => print_above_average(&store),
            8 => print_keyword_matches(&store),
            9 => delete_saved_vacancy(settings),
            10 => show_saved_employers(settings),
            _ => break,
        };
        if let Err(e) = outcome {
            println!("Action failed: {:#}", e);
        }
    }

    store.close().context("Failed to close the database")?;
    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn search_vacancies_to_file(api: &dyn JobBoard, settings: &Settings) -> Result<()> {
    let keyword: String = Input::new()
        .with_prompt("Keyword to search vacancies for")
        .interact_text()?;

    let spinner = spinner("Searching vacancies...")?;
    let vacancies = api.search_vacancies(&SearchQuery::text(keyword).per_page(settings.per_page));
    spinner.finish_and_clear();

    let file = JsonFile::new(settings.vacancies_file());
    let count = vacancies.len();
    file.append_all(vacancies)
        .with_context(|| format!("Failed to write {}", file.path().display()))?;
    println!("Saved {} vacancies to {}", count, file.path().display());
    Ok(())
}

fn search_employer_to_file(api: &dyn JobBoard, settings: &Settings) -> Result<()> {
    let name: String = Input::new().with_prompt("Company name").interact_text()?;

    let spinner = spinner("Searching employers...")?;
    let employers = api.search_employers(&SearchQuery::text(name).per_page(1));
    spinner.finish_and_clear();

    match employers.into_iter().next() {
        Some(employer) => {
            let label = Employer::from_record(&employer).name;
            let file = JsonFile::new(settings.employers_file());
            file.append(employer)
                .with_context(|| format!("Failed to write {}", file.path().display()))?;
            println!("Saved employer {}", label);
        }
        None => println!("Employer not found"),
    }
    Ok(())
}

fn show_saved_vacancies(settings: &Settings) -> Result<()> {
    let mut vacancies: Vec<Vacancy> = JsonFile::new(settings.vacancies_file())
        .read()
        .iter()
        .map(Vacancy::from_record)
        .collect();
    if vacancies.is_empty() {
        println!("No saved vacancies.");
        return Ok(());
    }

    vacancies.sort_by(|a, b| by_salary(b, a));
    for v in &vacancies {
        println!(
            "{} | {} | {} | {}",
            v.employer_name,
            v.name,
            salary_label(Some(v.salary)),
            v.url
        );
    }
    Ok(())
}

fn show_saved_employers(settings: &Settings) -> Result<()> {
    let employers: Vec<Employer> = JsonFile::new(settings.employers_file())
        .read()
        .iter()
        .map(Employer::from_record)
        .collect();
    if employers.is_empty() {
        println!("No saved employers.");
    }
    for e in &employers {
        let id = e.id.map(|id| id.to_string()).unwrap_or_default();
        println!("{} | {} | {}", id, e.name, e.url);
        if !e.description.is_empty() {
            println!("    {}", e.description);
        }
    }
    Ok(())
}

fn delete_saved_vacancy(settings: &Settings) -> Result<()> {
    let id: String = Input::new().with_prompt("Vacancy id").interact_text()?;
    let file = JsonFile::new(settings.vacancies_file());
    let before = file.read().len();
    file.delete(&Value::String(id.trim().to_string()))
        .with_context(|| format!("Failed to write {}", file.path().display()))?;
    println!("Removed {} record(s)", before - file.read().len());
    Ok(())
}

fn load_companies_with_progress(api: &dyn JobBoard, store: &Store, settings: &Settings) -> Result<()> {
    let spinner = spinner("Loading companies...")?;
    let loaded = load_companies(api, store, &COMPANIES, settings.per_page);
    spinner.finish_and_clear();

    for (name, count) in loaded? {
        println!("Loaded: {} + {} vacancies", name, count);
    }
    Ok(())
}

/// For each company name: take the first employer hit, store it, then store
/// every vacancy of that employer. Names with no hit, or whose hit lacks an
/// id or a name, are skipped. Returns
/// `(employer name, vacancies stored)` per loaded employer.
pub fn load_companies(
    api: &dyn JobBoard,
    store: &Store,
    names: &[&str],
    per_page: u32,
) -> Result<Vec<(String, usize)>> {
    let mut loaded = Vec::new();
    for name in names {
        let Some(employer) = api.search_employers(&SearchQuery::text(*name).per_page(1)).into_iter().next() else {
            warn!("No employer found for {}", name);
            continue;
        };
        if record_id(employer.get("id")).is_none() {
            warn!("Employer hit for {} has no usable id, skipped", name);
            continue;
        }
        let Some(label) = employer.get("name").and_then(Value::as_str).map(str::to_string) else {
            warn!("Employer hit for {} has no name, skipped", name);
            continue;
        };

        let employer_id = store
            .save_employer(&employer)
            .with_context(|| format!("Failed to save employer for {}", name))?;
        let vacancies = api.search_vacancies(&SearchQuery::employer(employer_id).per_page(per_page));
        for vacancy in &vacancies {
            store
                .save_vacancy(vacancy, employer_id)
                .with_context(|| format!("Failed to save vacancy of employer {}", employer_id))?;
        }

        info!("Loaded {} with {} vacancies", label, vacancies.len());
        loaded.push((label, vacancies.len()));
    }
    Ok(loaded)
}

fn print_company_counts(store: &Store) -> Result<()> {
    for c in store.companies_and_vacancy_counts()? {
        println!("{}: {}", c.name, c.vacancies);
    }
    Ok(())
}

fn print_all_vacancies(store: &Store) -> Result<()> {
    for v in store.all_vacancies()? {
        println!(
            "{} | {} | {} {} | {}",
            v.employer_name,
            v.title,
            salary_range(v.salary_from, v.salary_to),
            v.currency.unwrap_or_default(),
            v.url
        );
    }
    Ok(())
}

fn print_average_salary(store: &Store) -> Result<()> {
    println!("Average salary: {:.0}", store.average_salary()?);
    Ok(())
}

fn print_above_average(store: &Store) -> Result<()> {
    for v in store.vacancies_above_average_salary()? {
        println!(
            "{} | {} | {} | {}",
            v.employer_name,
            v.title,
            salary_range(v.salary_from, v.salary_to),
            v.url
        );
    }
    Ok(())
}

fn print_keyword_matches(store: &Store) -> Result<()> {
    let keyword: String = Input::new()
        .with_prompt("Keyword")
        .allow_empty(true)
        .interact_text()?;
    let matches = store.vacancies_matching_keyword(&keyword)?;
    if matches.is_empty() {
        println!("No vacancies match {:?}", keyword);
    }
    for v in matches {
        println!("{} | {} | {}", v.employer_name, v.title, v.url);
    }
    Ok(())
}

fn salary_range(from: Option<i64>, to: Option<i64>) -> String {
    match (from, to) {
        (None, None) => salary_label(None),
        (Some(f), None) => format!("from {}", f),
        (None, Some(t)) => format!("up to {}", t),
        (Some(f), Some(t)) => format!("{}-{}", f, t),
    }
}
