// src/utils/log.rs

//! Operator-facing console sections.
//!
//! Events go through the `log` facade; these helpers print the banners,
//! step markers and summaries an operator reads while a run is going.

use chrono::Local;

fn emit(line: &str) {
    println!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), line);
}

/// Print a banner.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    emit(&border);
    emit(&format!("  {title}"));
    emit(&border);
}

/// Print a numbered step of a multi-phase run.
pub fn step(step_num: usize, total: usize, message: &str) {
    emit(&format!("[STEP {step_num}/{total}] {message}"));
}

/// Print an indented detail line.
pub fn sub_item(message: &str) {
    emit(&format!("    {message}"));
}

/// Print a success line.
pub fn success(message: &str) {
    emit(&format!("✓ {message}"));
}

/// Print a warning line and record it through the `log` facade.
pub fn warn(message: &str) {
    ::log::warn!("{message}");
    emit(&format!("⚠ {message}"));
}

/// Print a titled key/value block.
pub fn summary(title: &str, items: &[(&str, String)]) {
    emit(&format!("[SUMMARY] {title}"));
    let width = items.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in items {
        emit(&format!("    {key:<width$}  {value}"));
    }
}

