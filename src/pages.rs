// src/pages.rs
use crate::models::{Choice, Question};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn vote_label(votes: i32) -> String {
    if votes == 1 {
        "1 vote".to_string()
    } else {
        format!("{votes} votes")
    }
}

/// Listing page: one link per eligible question, newest first.
pub fn index_page(questions: &[Question]) -> String {
    let body = if questions.is_empty() {
        "<p>No polls are available.</p>".to_string()
    } else {
        let items: String = questions
            .iter()
            .map(|question| {
                format!(
                    "  <li><a href=\"/polls/{}/\">{}</a></li>\n",
                    question.id,
                    escape(&question.question_text)
                )
            })
            .collect();
        format!("<ul>\n{items}</ul>")
    };
    page("Polls", &body)
}

/// Detail page: the question text and a vote form over its choices.
pub fn detail_page(question: &Question, choices: &[Choice], error: Option<&str>) -> String {
    let title = escape(&question.question_text);
    let mut body = format!("<h1>{title}</h1>\n");
    if let Some(message) = error {
        body.push_str(&format!("<p><strong>{}</strong></p>\n", escape(message)));
    }
    body.push_str(&format!(
        "<form action=\"/polls/{}/vote/\" method=\"post\">\n",
        question.id
    ));
    for choice in choices {
        body.push_str(&format!(
            "  <input type=\"radio\" name=\"choice\" id=\"choice{id}\" value=\"{id}\">\n  <label for=\"choice{id}\">{text}</label><br>\n",
            id = choice.id,
            text = escape(&choice.choice_text),
        ));
    }
    body.push_str("  <input type=\"submit\" value=\"Vote\">\n</form>");
    page(&title, &body)
}

/// Results page: the question text and the tally per choice.
pub fn results_page(question: &Question, choices: &[Choice]) -> String {
    let title = escape(&question.question_text);
    let items: String = choices
        .iter()
        .map(|choice| {
            format!(
                "  <li>{} -- {}</li>\n",
                escape(&choice.choice_text),
                vote_label(choice.votes)
            )
        })
        .collect();
    let body = format!(
        "<h1>{title}</h1>\n<ul>\n{items}</ul>\n<a href=\"/polls/{}/\">Vote again?</a>",
        question.id
    );
    page(&title, &body)
}

pub fn not_found_page() -> String {
    page(
        "Not Found",
        "<h1>Not Found</h1>\n<p>No question matches the given query.</p>",
    )
}
