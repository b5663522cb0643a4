// Version banner written above the bundled declarations

use chrono::{Datelike, Local};

const DEFAULT_COPYRIGHT: &str = "Devsoft Baltic OÜ  - https://surveyjs.io/";

/// Product banner block, terminated by a blank line
pub fn render_banner(
    name: &str,
    version: Option<&str>,
    copyright: Option<&str>,
    license: Option<&str>,
) -> String {
    render_banner_for_year(name, version, copyright, license, Local::now().year())
}

fn render_banner_for_year(
    name: &str,
    version: Option<&str>,
    copyright: Option<&str>,
    license: Option<&str>,
    year: i32,
) -> String {
    let mut lines = vec!["/*".to_string()];
    match version.filter(|v| !v.is_empty()) {
        Some(version) => lines.push(format!("* {} v{}", name, version)),
        None => lines.push(format!("* {}", name)),
    }
    lines.push(format!(
        "* Copyright (c) 2015-{} {}",
        year,
        copyright.unwrap_or(DEFAULT_COPYRIGHT)
    ));
    if let Some(license) = license.filter(|l| !l.is_empty()) {
        lines.push(format!("* License: {}", license));
    }
    lines.push("*/".to_string());
    lines.push(String::new());
    lines.join("\n")
}
