//! Blocking console prompts. Every prompt loops until it reads a valid value
//! and returns `None` only when the input stream is gone, which callers
//! treat as a shutdown request.

use crate::model::{AttendanceStatus, Role};
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};

fn read_line() -> Option<String> {
    let mut buf = String::new();
    match io::stdin().lock().read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf),
        Err(_) => None,
    }
}

fn show(prompt: &str) {
    print!("{}", prompt);
    let _ = io::stdout().flush();
}

pub fn prompt_nonempty(label: &str) -> Option<String> {
    loop {
        show(&format!("{}: ", label));
        let line = read_line()?;
        let value = line.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
        println!("{} cannot be empty.", label);
    }
}

pub fn prompt_login() -> Option<(String, String)> {
    println!("\n--- LOGIN ---");
    let username = prompt_nonempty("Username")?;
    let password = prompt_nonempty("Password")?;
    Some((username, password))
}

/// Menu selection from a fixed key set; re-prompts until a listed key.
pub fn prompt_menu(options: &[(&str, &str)]) -> Option<String> {
    println!("\n--- MENU ---");
    for (key, label) in options {
        println!("{}. {}", key, label);
    }
    loop {
        show("Select an option: ");
        let line = read_line()?;
        let selection = line.trim();
        if options.iter().any(|(key, _)| *key == selection) {
            return Some(selection.to_string());
        }
        println!("Invalid selection. Please try again.");
    }
}

pub fn prompt_confirmation(message: &str) -> Option<bool> {
    loop {
        show(&format!("{} (y/n): ", message));
        let line = read_line()?;
        match line.trim().to_lowercase().as_str() {
            "y" => return Some(true),
            "n" => return Some(false),
            _ => println!("Please enter 'y' or 'n'."),
        }
    }
}

pub fn prompt_date(label: &str) -> Option<String> {
    loop {
        let value = prompt_nonempty(label)?;
        if NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_ok() {
            return Some(value);
        }
        println!("Date must be a valid YYYY-MM-DD.");
    }
}

pub fn prompt_status(label: &str) -> Option<AttendanceStatus> {
    loop {
        let value = prompt_nonempty(label)?;
        if let Some(status) = AttendanceStatus::parse(&value) {
            return Some(status);
        }
        println!("Status must be one of P, A, L, E.");
    }
}

pub fn prompt_role(label: &str) -> Option<Role> {
    loop {
        let value = prompt_nonempty(label)?;
        if let Some(role) = Role::parse(&value) {
            return Some(role);
        }
        println!("Role must be one of Admin, Teacher, Student.");
    }
}

/// Number within `[min, max]`; `max = None` leaves the range open above.
pub fn prompt_f64(label: &str, min: f64, max: Option<f64>) -> Option<f64> {
    loop {
        let value = prompt_nonempty(label)?;
        if let Ok(v) = value.parse::<f64>() {
            let high_ok = max.map(|m| v <= m).unwrap_or(true);
            if v >= min && high_ok {
                return Some(v);
            }
        }
        match max {
            Some(m) => println!("{} must be a number between {} and {}.", label, min, m),
            None => println!("{} must be a number of at least {}.", label, min),
        }
    }
}

/// Strictly positive number (a zero maximum score cannot make a percentage).
pub fn prompt_positive_f64(label: &str) -> Option<f64> {
    loop {
        let value = prompt_nonempty(label)?;
        if let Ok(v) = value.parse::<f64>() {
            if v > 0.0 {
                return Some(v);
            }
        }
        println!("{} must be a number greater than 0.", label);
    }
}
