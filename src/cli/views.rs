//! Plain-text rendering for the terminal.

use std::fmt::Write;

use crate::api::{Analytics, Interview, InterviewStatus, Question};
use crate::app::Dashboard;
use crate::interview::{format_clock, InterviewView};
use crate::router::MenuItem;
use crate::session::Profile;

fn date_or_dash(date: Option<chrono::NaiveDateTime>) -> String {
    date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn profile(profile: &Profile, menu: &[MenuItem]) -> String {
    let items: Vec<&str> = menu.iter().map(|item| item.label()).collect();
    format!(
        "{} <{}> ({:?})\nAvailable: {}",
        profile.display_name(),
        profile.email,
        profile.role,
        items.join(" | ")
    )
}

pub fn dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let summary = dashboard.summary;
    let _ = writeln!(out, "Welcome back, {}!", dashboard.profile.display_name());
    let _ = writeln!(
        out,
        "Total: {}   Completed: {}   In progress: {}",
        summary.total, summary.completed, summary.in_progress
    );

    if dashboard.interviews.is_empty() {
        let _ = write!(out, "\nNo interviews yet. Start one with `mockmate start`.");
        return out;
    }

    let _ = writeln!(out);
    for interview in &dashboard.interviews {
        let action = match interview.status {
            InterviewStatus::Completed => format!("mockmate results {}", interview.id),
            status if status.is_resumable() => format!("mockmate resume {}", interview.id),
            _ => String::new(),
        };
        let _ = writeln!(
            out,
            "#{:<5} {:<24} {:<16} {:<12} {:>9}  {}  {}",
            interview.id,
            interview.job_role,
            interview.domain,
            interview.status.label(),
            interview.score_label(),
            date_or_dash(interview.start_time),
            action
        );
    }
    out.trim_end().to_string()
}

pub fn results(interview: &Interview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Interview Results");
    let _ = writeln!(out, "{} - {}", interview.job_role, interview.domain);
    let _ = writeln!(out, "Overall Score: {}", interview.score_label());
    let _ = writeln!(
        out,
        "Questions Answered: {}/{}",
        interview.answered(),
        interview
            .total_questions
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string())
    );
    let _ = writeln!(out, "Status: {}", interview.status.label());
    let _ = writeln!(out, "Started: {}", date_or_dash(interview.start_time));
    let _ = write!(out, "Ended: {}", date_or_dash(interview.end_time));
    out
}

pub fn analytics(analytics: &Analytics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Performance Analytics");
    let _ = writeln!(
        out,
        "Interviews: {} ({} completed, {:.0}%)",
        analytics.total_interviews,
        analytics.completed_interviews,
        analytics.completion_rate()
    );
    let _ = writeln!(
        out,
        "Scores: average {:.1}  best {:.1}  worst {:.1}",
        analytics.average_score, analytics.best_score, analytics.worst_score
    );
    if !analytics.topic_strengths.trim().is_empty() {
        let _ = writeln!(out, "Strengths: {}", analytics.topic_strengths.trim());
    }
    if !analytics.topic_weaknesses.trim().is_empty() {
        let _ = writeln!(out, "To improve: {}", analytics.topic_weaknesses.trim());
    }
    let _ = writeln!(out, "Last interview: {}", date_or_dash(analytics.last_interview_date));

    if !analytics.domain_performance.is_empty() {
        let _ = writeln!(out, "\nBy domain:");
        for (domain, score) in &analytics.domain_performance {
            let _ = writeln!(out, "  {:<20} {:>5.1}", domain, score);
        }
    }

    if !analytics.interview_history.is_empty() {
        let _ = writeln!(out, "\nHistory:");
        for entry in &analytics.interview_history {
            let _ = writeln!(
                out,
                "  #{:<5} {:<24} {:<16} {:>5.1}  {}",
                entry.id,
                entry.job_role,
                entry.domain,
                entry.score.unwrap_or(0.0),
                date_or_dash(entry.date)
            );
        }
    }
    out.trim_end().to_string()
}

pub fn questions(questions: &[Question]) -> String {
    if questions.is_empty() {
        return "No questions found.".to_string();
    }
    let mut out = format!("{} question(s)\n", questions.len());
    for q in questions {
        let _ = writeln!(
            out,
            "#{:<5} [{}] d{} {:>4}s  {}",
            q.id,
            q.question_type.map(|t| t.as_str()).unwrap_or("-"),
            q.difficulty.unwrap_or(0),
            q.time_limit(),
            q.prompt
        );
    }
    out.trim_end().to_string()
}

pub fn question_header(view: &InterviewView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "── {} ── {} / {}",
        view.progress_label,
        view.job_role.as_deref().unwrap_or("-"),
        view.domain.as_deref().unwrap_or("-")
    );
    if let Some(question) = &view.question {
        let kind = question.question_type.map(|t| t.as_str()).unwrap_or("QUESTION");
        let _ = writeln!(
            out,
            "[{}] difficulty {}/5  ⏱️ {}",
            kind,
            question.difficulty.unwrap_or(1),
            format_clock(view.timer.limit_seconds)
        );
        let _ = writeln!(out, "\n{}", question.prompt);
        if let Some(hint) = question.hint() {
            let _ = writeln!(out, "💡 Hint: {}", hint);
        }
    }
    out.trim_end().to_string()
}
