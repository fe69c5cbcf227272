//! Server-rendered HTML pages.
//!
//! Small enough that the pages are formatted strings; every piece of
//! user-controlled text goes through [`escape`] before interpolation.

use crate::taskoj::store::TaskRow;

/// Escape text for interpolation into HTML body or attribute positions.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - taskoj</title>
<style>
body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }}
.notice {{ background: #fff3cd; padding: 0.5rem; }}
.done {{ text-decoration: line-through; color: #777; }}
li {{ margin: 0.25rem 0; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#
    )
}

fn notice(flash: Option<&str>) -> String {
    flash.map_or_else(String::new, |message| {
        format!("<p class=\"notice\">{}</p>\n", escape(message))
    })
}

#[must_use]
pub fn register(flash: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Register</h1>
{}<form method="post" action="/register">
<input name="username" placeholder="Username" required>
<input name="password" type="password" placeholder="Password" required>
<button type="submit">Register</button>
</form>
<p>Already have an account? <a href="/login">Log in</a></p>"#,
        notice(flash)
    );

    layout("Register", &body)
}

#[must_use]
pub fn login(flash: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
{}<form method="post" action="/login">
<input name="username" placeholder="Username" required>
<input name="password" type="password" placeholder="Password" required>
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
        notice(flash)
    );

    layout("Log in", &body)
}

#[must_use]
pub fn tasks(tasks: &[TaskRow]) -> String {
    let items: String = tasks
        .iter()
        .map(|task| {
            let class = if task.done { " class=\"done\"" } else { "" };
            let toggle = if task.done { "undo" } else { "done" };
            format!(
                "<li{class}>{title} <a href=\"/done/{id}\">{toggle}</a> <a href=\"/delete/{id}\">delete</a></li>\n",
                title = escape(&task.title),
                id = task.id,
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Tasks</h1>
<form method="post" action="/tasks">
<input name="title" placeholder="New task">
<button type="submit">Add</button>
</form>
<ul>
{items}</ul>
<p><a href="/logout">Log out</a></p>"#
    );

    layout("Tasks", &body)
}
