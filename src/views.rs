//! Server-rendered pages. Every interpolated value goes through [`escape`].

use axum::response::Html;

use crate::{contacts::repo_types::Contact, flash::Flash};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn layout(title: &str, flash: Option<Flash>, body: &str) -> Html<String> {
    let flash_html = flash
        .map(|f| format!(r#"<div class="flash {}">{}</div>"#, f.category(), escape(f.message())))
        .unwrap_or_default();
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} - Contact Portal</title></head>
<body>
<main>
<h1>{title}</h1>
{flash_html}
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    ))
}

pub fn login_page(flash: Option<Flash>) -> Html<String> {
    layout(
        "Login",
        flash,
        r#"<form method="post" action="/login">
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Log in</button>
</form>
<p><a href="/register">Register</a> | <a href="/forgot-password">Forgot password?</a></p>"#,
    )
}

pub fn register_page(flash: Option<Flash>) -> Html<String> {
    layout(
        "Register",
        flash,
        r#"<form method="post" action="/register">
<label>Username <input name="username" required></label>
<label>Email <input name="email" type="email" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Register</button>
</form>
<p><a href="/login">Back to login</a></p>"#,
    )
}

pub fn forgot_password_page(flash: Option<Flash>) -> Html<String> {
    layout(
        "Forgot Password",
        flash,
        r#"<form method="post" action="/forgot-password">
<label>Email <input name="email" type="email" required></label>
<button type="submit">Send reset link</button>
</form>
<p><a href="/login">Back to login</a></p>"#,
    )
}

pub fn reset_password_page(token: &str, flash: Option<Flash>) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/reset-password/{}">
<label>New password <input name="password" type="password" required></label>
<button type="submit">Reset password</button>
</form>"#,
        escape(token)
    );
    layout("Reset Password", flash, &body)
}

/// `searched` marks a render that shows a single search hit.
pub fn dashboard_page(
    username: &str,
    contacts: &[Contact],
    searched: Option<&Contact>,
    flash: Option<Flash>,
) -> Html<String> {
    let mut body = format!(
        r#"<p>Logged in as <strong>{}</strong> | <a href="/logout">Log out</a></p>
<h2>Add contact</h2>
<form method="post" action="/add-contact">
<label>Mobile <input name="mobile"></label>
<label>Email <input name="email"></label>
<label>Address <input name="address"></label>
<label>Registration number <input name="registration_number"></label>
<button type="submit">Add</button>
</form>
<h2>Search</h2>
<form method="post" action="/search-contact">
<label>Registration number <input name="registration_number" required></label>
<button type="submit">Search</button>
</form>
"#,
        escape(username)
    );

    if let Some(hit) = searched {
        body.push_str(&format!(
            r#"<p class="search-result">Found contact {}. <a href="/dashboard">Show all</a></p>"#,
            escape(&hit.registration_number)
        ));
    }

    body.push_str("<h2>Contacts</h2>\n");
    if contacts.is_empty() {
        body.push_str("<p>No contacts yet.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Registration number</th><th>Mobile</th><th>Email</th><th>Address</th><th></th></tr>\n",
        );
        for c in contacts {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><form method=\"post\" action=\"/delete-contact/{}\"><button type=\"submit\">Delete</button></form></td></tr>\n",
                escape(&c.registration_number),
                escape(&c.mobile),
                escape(&c.email),
                escape(&c.address),
                c.id,
            ));
        }
        body.push_str("</table>\n");
    }

    layout("Dashboard", flash, &body)
}
