//! HTML rendering for the prediction form.
//!
//! The page is a single form with one `<select>` per attribute, ordered
//! alphabetically by attribute name. Each select starts on an empty
//! placeholder option and only offers codes the model was trained on.

use std::fmt::Write;

use sporecast::{ColumnIndex, Prediction, Selections, ValidationError};

/// What to show under the form.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// Fresh form, nothing submitted yet.
    Empty,
    Prediction(Prediction),
    Invalid(&'a ValidationError),
    /// The prediction could not be computed.
    Failure(&'a str),
}

const TITLE: &str = "Mushroom Edibility Prediction";
const PLACEHOLDER: &str = "Choose an option";

const STYLE: &str = "\
body { font-family: sans-serif; max-width: 42rem; margin: 2rem auto; padding: 0 1rem; }
.field { margin-bottom: 1rem; }
.field label { display: block; font-weight: bold; }
.field .hint { color: #555; font-size: 0.9rem; margin: 0.2rem 0; }
.field select { width: 100%; padding: 0.3rem; }
button { padding: 0.5rem 2rem; font-size: 1rem; }
.result { margin-top: 1.5rem; padding: 1rem; border-radius: 0.4rem; }
.result.edible { background: #e6f4ea; border: 1px solid #34a853; }
.result.poisonous { background: #fce8e6; border: 1px solid #d93025; }
.result.invalid { background: #fef7e0; border: 1px solid #f9ab00; }
.result.failure { background: #f1f3f4; border: 1px solid #5f6368; }
";

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the full page.
pub fn page(index: &ColumnIndex, selections: &Selections, outcome: Outcome<'_>) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{TITLE}</title>");
    let _ = writeln!(html, "<style>\n{STYLE}</style>\n</head>\n<body>");
    let _ = writeln!(html, "<h1>&#127812; {TITLE}</h1>");
    html.push_str("<h4>Provide Mushroom Features:</h4>\n");

    form(&mut html, index, selections);
    result(&mut html, index, outcome);

    html.push_str("</body>\n</html>\n");
    html
}

fn form(html: &mut String, index: &ColumnIndex, selections: &Selections) {
    html.push_str("<form method=\"post\" action=\"/predict\">\n");

    let mut groups: Vec<_> = index.groups().iter().collect();
    groups.sort_by_key(|g| g.attribute().name);

    for group in groups {
        let attribute = group.attribute();
        let name = escape(attribute.name);
        let selected = selections.get(attribute.name);

        let _ = writeln!(html, "<div class=\"field\">");
        let _ = writeln!(
            html,
            "<label for=\"{name}\">{}</label>",
            escape(&attribute.display_name())
        );
        let _ = writeln!(html, "<p class=\"hint\">{}</p>", escape(attribute.description));
        let _ = writeln!(html, "<select id=\"{name}\" name=\"{name}\">");
        let _ = writeln!(
            html,
            "<option value=\"\"{}>{PLACEHOLDER}</option>",
            if selected.is_none() { " selected" } else { "" }
        );
        for code in group.trained_codes() {
            let label = attribute.category(code).map_or(code, |c| c.label);
            let _ = writeln!(
                html,
                "<option value=\"{}\"{}>{} ({})</option>",
                escape(code),
                if selected == Some(code) { " selected" } else { "" },
                escape(label),
                escape(code)
            );
        }
        html.push_str("</select>\n</div>\n");
    }

    html.push_str("<button type=\"submit\">Predict</button>\n</form>\n");
}

fn result(html: &mut String, index: &ColumnIndex, outcome: Outcome<'_>) {
    match outcome {
        Outcome::Empty => {}
        Outcome::Prediction(Prediction::Poisonous) => {
            html.push_str("<div class=\"result poisonous\">&#9760;&#65039; ");
            html.push_str("The mushroom is <strong>Poisonous</strong>!</div>\n");
        }
        Outcome::Prediction(Prediction::Edible) => {
            html.push_str("<div class=\"result edible\">&#127812; ");
            html.push_str("The mushroom is <strong>Edible</strong>!</div>\n");
        }
        Outcome::Invalid(err) => {
            html.push_str("<div class=\"result invalid\">\n");
            if !err.missing.is_empty() {
                html.push_str("<p>Please select a value for:</p>\n<ul>\n");
                for name in &err.missing {
                    let _ = writeln!(html, "<li>{}</li>", escape(&display_name(index, name)));
                }
                html.push_str("</ul>\n");
            }
            if !err.invalid.is_empty() {
                html.push_str("<p>These selections cannot be used:</p>\n<ul>\n");
                for inv in &err.invalid {
                    let _ = writeln!(
                        html,
                        "<li>{}: &quot;{}&quot; ({})</li>",
                        escape(&display_name(index, &inv.attribute)),
                        escape(&inv.code),
                        escape(&inv.reason.to_string())
                    );
                }
                html.push_str("</ul>\n");
            }
            html.push_str("</div>\n");
        }
        Outcome::Failure(message) => {
            let _ = writeln!(
                html,
                "<div class=\"result failure\">Prediction failed: {}</div>",
                escape(message)
            );
        }
    }
}

fn display_name(index: &ColumnIndex, attribute: &str) -> String {
    index
        .schema()
        .attribute(attribute)
        .map_or_else(|| attribute.to_string(), |a| a.display_name())
}
