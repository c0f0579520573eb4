//! Server-rendered HTML pages.
//!
//! Pages are plain strings; every interpolated value passes through [`escape`].

use std::fmt::Write;

use axum::response::Html;

use crate::{
    validation::FieldError,
    workouts::{dto::ChartPoint, dto::WorkoutForm, repo_types::Workout},
};

/// User-visible notice rendered above the page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: "success",
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: "danger",
            message: message.into(),
        }
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, username: Option<&str>, notices: &[Notice], body: &str) -> Html<String> {
    let nav = match username {
        Some(name) => format!(
            r#"<span>Signed in as {}</span> <a href="/dashboard">Dashboard</a> <a href="/log">Log workout</a> <a href="/export">Export CSV</a> <a href="/logout">Log out</a>"#,
            escape(name)
        ),
        None => r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#.to_string(),
    };
    let mut flashes = String::new();
    for n in notices {
        flashes.push_str(&format!(
            r#"<div class="notice notice-{}">{}</div>"#,
            n.level,
            escape(&n.message)
        ));
    }
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} · LiftLog</title></head>
<body>
<nav>{nav}</nav>
{flashes}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn field_errors(errors: &[FieldError], field: &str) -> String {
    errors
        .iter()
        .filter(|e| e.field == field)
        .map(|e| format!(r#"<span class="field-error">{}</span>"#, escape(&e.message)))
        .collect()
}

fn input(label: &str, name: &str, kind: &str, value: &str, errors: &[FieldError]) -> String {
    format!(
        r#"<p><label for="{name}">{label}</label> <input id="{name}" name="{name}" type="{kind}" value="{value}"> {errs}</p>"#,
        label = escape(label),
        value = escape(value),
        errs = field_errors(errors, name),
    )
}

pub fn register_page(username: &str, notices: &[Notice], errors: &[FieldError]) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/register">{}{}<button type="submit">Register</button></form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
        input("Username", "username", "text", username, errors),
        input("Password", "password", "password", "", errors),
    );
    layout("Register", None, notices, &body)
}

pub fn login_page(username: &str, notices: &[Notice], errors: &[FieldError]) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/login">{}{}<button type="submit">Login</button></form>
<p>No account? <a href="/register">Register</a></p>"#,
        input("Username", "username", "text", username, errors),
        input("Password", "password", "password", "", errors),
    );
    layout("Log in", None, notices, &body)
}

pub fn log_page(
    username: &str,
    form: &WorkoutForm,
    notices: &[Notice],
    errors: &[FieldError],
) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/log">{}{}{}{}<button type="submit">Log Workout</button></form>"#,
        input("Exercise", "exercise", "text", &form.exercise, errors),
        input("Reps", "reps", "number", &form.reps, errors),
        input("Weight", "weight", "text", &form.weight, errors),
        input("Date", "date", "date", &form.date, errors),
    );
    layout("Log workout", Some(username), notices, &body)
}

/// Makes JSON safe to embed inside a `<script>` element.
fn script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

pub fn dashboard_page(
    username: &str,
    workouts: &[Workout],
    chart: &[ChartPoint],
    notices: &[Notice],
) -> anyhow::Result<Html<String>> {
    let mut rows = String::new();
    for w in workouts {
        write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            w.date,
            escape(&w.exercise),
            w.reps,
            w.weight
        )?;
    }
    let table = if workouts.is_empty() {
        r#"<p>No workouts yet. <a href="/log">Log your first one.</a></p>"#.to_string()
    } else {
        format!(
            "<table><thead><tr><th>Date</th><th>Exercise</th><th>Reps</th><th>Weight</th></tr></thead><tbody>{rows}</tbody></table>"
        )
    };
    let chart_json = script_json(&serde_json::to_string(chart)?);
    let body = format!(
        r#"<canvas id="progress-chart"></canvas>
<script id="chart-data" type="application/json">{chart_json}</script>
<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<script>
const points = JSON.parse(document.getElementById('chart-data').textContent).reverse();
new Chart(document.getElementById('progress-chart'), {{
  type: 'line',
  data: {{
    labels: points.map(p => p.date),
    datasets: [
      {{ label: 'Reps', data: points.map(p => p.reps) }},
      {{ label: 'Weight', data: points.map(p => p.weight) }}
    ]
  }}
}});
</script>
{table}"#
    );
    Ok(layout("Dashboard", Some(username), notices, &body))
}
