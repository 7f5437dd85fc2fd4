use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::export;
use crate::orchestrator::{Orchestrator, Outcome};
use crate::session::Session;
use crate::wire::{AppStep, Direction, FormField, STEPS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Back,
    Quit,
    /// Keep the current value and move on.
    Keep,
    /// Empty the current field and move on.
    Clear,
    Set(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryAction {
    Edit(usize),
    ExtraDetails,
    Generate,
    Quit,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewAction {
    Choose(usize),
    Regenerate,
    Back,
    Quit,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultAction {
    StartOver,
    Quit,
    Refine(String),
    Nothing,
}

pub fn parse_form(input: &str) -> FormAction {
    match input.trim() {
        ":back" | ":b" => FormAction::Back,
        ":quit" | ":q" => FormAction::Quit,
        ":clear" | ":c" => FormAction::Clear,
        "" => FormAction::Keep,
        other => FormAction::Set(other.to_string()),
    }
}

pub fn parse_summary(input: &str) -> SummaryAction {
    let t = input.trim().to_lowercase();
    match t.as_str() {
        "g" | "generate" => SummaryAction::Generate,
        "x" | "extra" => SummaryAction::ExtraDetails,
        "q" | "quit" => SummaryAction::Quit,
        _ => match t.parse::<usize>() {
            Ok(n) if (1..=STEPS.len()).contains(&n) => SummaryAction::Edit(n - 1),
            _ => SummaryAction::Unknown,
        },
    }
}

pub fn parse_preview(input: &str, images: usize) -> PreviewAction {
    let t = input.trim().to_lowercase();
    match t.as_str() {
        "r" | "regenerate" => PreviewAction::Regenerate,
        "b" | "back" => PreviewAction::Back,
        "q" | "quit" => PreviewAction::Quit,
        _ => match t.parse::<usize>() {
            Ok(n) if (1..=images).contains(&n) => PreviewAction::Choose(n - 1),
            _ => PreviewAction::Unknown,
        },
    }
}

/// Anything that is not a command is a refinement instruction, sent as typed;
/// blank input is ignored.
pub fn parse_result(input: &str) -> ResultAction {
    match input.trim() {
        ":start-over" | ":s" => ResultAction::StartOver,
        ":quit" | ":q" => ResultAction::Quit,
        "" => ResultAction::Nothing,
        _ => ResultAction::Refine(input.to_string()),
    }
}

/// Phase to render, or `None` while a generation holds the session.
fn visible_phase(session: &Session) -> Option<AppStep> {
    (!session.is_loading()).then(|| session.phase())
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{} ", prompt.bold());
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim_end_matches(['\r', '\n']).to_string()),
    }
}

const BUSY: &str = "A generation is already running; try again when it finishes.";

async fn with_spinner<F: Future<Output = Outcome>>(orch: &Orchestrator, msg: &str, fut: F) -> Outcome {
    if orch.is_busy() {
        println!("{}", BUSY.yellow());
        return Outcome::Busy;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    let out = fut.await;
    pb.finish_and_clear();
    if out == Outcome::Busy {
        println!("{}", BUSY.yellow());
    }
    out
}

/// Shown once above the phase content, then dismissed.
fn show_banner(session: &mut Session) {
    if let Some(msg) = session.error() {
        println!("\n{}", format!(" ! {msg} ").white().on_red().bold());
    }
    session.dismiss_error();
}

fn show_form(session: &Session) {
    let w = &session.wizard;
    let step = w.current_step();
    let tag = if w.is_editing() { "  (editing)".yellow().to_string() } else { String::new() };
    let arrow = match w.direction() {
        Direction::Forward => "»",
        Direction::Backward => "«",
    };
    println!("\n{arrow} {} {}{}", format!("Step {}/{}", step.id, STEPS.len()).cyan().bold(), step.title.bold(), tag);
    println!("{}", step.placeholder.dimmed());
    let current = w.form().get(step.field);
    if !current.is_empty() {
        println!("current: {}", current);
    }
    let back = if w.is_first_step() { "" } else { ", :back" };
    println!("{}", format!("(enter to keep, :clear{back}, :quit)").dimmed());
}

fn show_summary(session: &Session) {
    let form = session.wizard.form();
    println!("\n=== {} ===", "SUMMARY".bold());
    for (i, s) in STEPS.iter().enumerate() {
        let value = form.get(s.field);
        let shown = if value.is_empty() { "(empty)".dimmed().to_string() } else { value.to_string() };
        println!("{}. {}: {}", i + 1, s.field.label().bold(), shown);
    }
    let extra = if form.has_extra_details() { form.extra_details.clone() } else { "(none)".dimmed().to_string() };
    println!("   {}: {}", FormField::ExtraDetails.label().bold(), extra);
    println!("{}", "[1-3] edit  [x] extra details  [g] generate preview  [q] quit".dimmed());
}

fn show_preview(session: &Session, out_dir: &Path) {
    let Some(p) = session.preview() else { return };
    println!("\n=== {} ===", "PREVIEW".bold());
    println!("{}", p.layout_description);
    match export::export_previews(out_dir, p) {
        Ok(paths) => {
            for (i, path) in paths.iter().enumerate() {
                println!("{}. {}", i + 1, path.display());
            }
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "could not write preview images");
            for i in 0..p.image_urls.len() {
                println!("{}. (image {} not saved)", i + 1, i + 1);
            }
        }
    }
    println!("{}", format!("[1-{}] build from mockup  [r] regenerate  [b] back  [q] quit", p.image_urls.len()).dimmed());
}

fn show_result(session: &Session, out_dir: &Path) {
    let Some(code) = session.final_code() else { return };
    println!("\n=== {} ===", "YOUR UI IS READY".green().bold());
    match export::export_html(out_dir, code) {
        Ok(out) => {
            println!("download ({}): {}", export::HTML_MIME, out.document.display());
            println!("preview:  {}", out.viewer.display());
        }
        Err(e) => println!("{} {e:#}", "could not write the document:".red()),
    }
    println!("{}", "Describe a change to refine it, or :start-over / :quit".dimmed());
}

/// Drives one session until the user quits or stdin closes.
pub async fn run(session: &mut Session, orch: &Orchestrator, out_dir: &Path) -> Result<()> {
    loop {
        show_banner(session);
        let Some(phase) = visible_phase(session) else {
            println!("{}", BUSY.yellow());
            if read_line("press enter to continue").is_none() {
                return Ok(());
            }
            continue;
        };
        match phase {
            AppStep::Form => {
                show_form(session);
                let Some(line) = read_line(">") else { return Ok(()) };
                match parse_form(&line) {
                    FormAction::Quit => return Ok(()),
                    FormAction::Back => session.wizard.back(),
                    FormAction::Keep => session.wizard.next(),
                    FormAction::Clear => {
                        let field = session.wizard.current_step().field;
                        session.wizard.update_field(field, "");
                        session.wizard.next();
                    }
                    FormAction::Set(v) => {
                        let field = session.wizard.current_step().field;
                        session.wizard.update_field(field, v);
                        session.wizard.next();
                    }
                }
            }
            AppStep::Summary => {
                show_summary(session);
                let Some(line) = read_line(">") else { return Ok(()) };
                match parse_summary(&line) {
                    SummaryAction::Quit => return Ok(()),
                    SummaryAction::Edit(i) => session.wizard.edit(i)?,
                    SummaryAction::ExtraDetails => {
                        if let Some(v) = read_line("extra details:") {
                            session.wizard.update_field(FormField::ExtraDetails, v.trim());
                        }
                    }
                    SummaryAction::Generate => {
                        with_spinner(orch, "Generating layout and mockups...", orch.generate_preview(session)).await;
                    }
                    SummaryAction::Unknown => println!("{}", "unknown choice".yellow()),
                }
            }
            AppStep::Preview => {
                show_preview(session, out_dir);
                let images = session.preview().map(|p| p.image_urls.len()).unwrap_or(0);
                let Some(line) = read_line(">") else { return Ok(()) };
                match parse_preview(&line, images) {
                    PreviewAction::Quit => return Ok(()),
                    PreviewAction::Back => session.wizard.back_to_summary(),
                    PreviewAction::Regenerate => {
                        with_spinner(orch, "Regenerating mockups...", orch.generate_preview(session)).await;
                    }
                    PreviewAction::Choose(i) => {
                        with_spinner(orch, "Writing the code...", orch.generate_code(session, i)).await;
                    }
                    PreviewAction::Unknown => println!("{}", "unknown choice".yellow()),
                }
            }
            AppStep::Result => {
                show_result(session, out_dir);
                let Some(line) = read_line("refine>") else { return Ok(()) };
                match parse_result(&line) {
                    ResultAction::Quit => return Ok(()),
                    ResultAction::StartOver => session.start_over(),
                    ResultAction::Nothing => {}
                    ResultAction::Refine(instruction) => {
                        with_spinner(orch, "Refining...", orch.refine_code(session, &instruction)).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_input() {
        assert_eq!(parse_form("  "), FormAction::Keep);
        assert_eq!(parse_form(":back"), FormAction::Back);
        assert_eq!(parse_form(" dark mode "), FormAction::Set("dark mode".into()));
        assert_eq!(parse_form(" :clear "), FormAction::Clear);
        assert_eq!(parse_form(":c"), FormAction::Clear);
    }

    #[test]
    fn loading_session_hides_phase_content() {
        let mut s = Session::new();
        assert_eq!(visible_phase(&s), Some(AppStep::Form));
        s.loading = true;
        assert_eq!(visible_phase(&s), None);
        s.loading = false;
        assert_eq!(visible_phase(&s), Some(AppStep::Form));
    }

    #[test]
    fn summary_edit_numbers_are_one_based() {
        assert_eq!(parse_summary("1"), SummaryAction::Edit(0));
        assert_eq!(parse_summary("3"), SummaryAction::Edit(2));
        assert_eq!(parse_summary("4"), SummaryAction::Unknown);
        assert_eq!(parse_summary("0"), SummaryAction::Unknown);
        assert_eq!(parse_summary("G"), SummaryAction::Generate);
    }

    #[test]
    fn preview_choice_bounded_by_image_count() {
        assert_eq!(parse_preview("2", 2), PreviewAction::Choose(1));
        assert_eq!(parse_preview("3", 2), PreviewAction::Unknown);
        assert_eq!(parse_preview("r", 2), PreviewAction::Regenerate);
    }

    #[test]
    fn blank_refinement_is_not_submitted() {
        assert_eq!(parse_result("   "), ResultAction::Nothing);
        assert_eq!(parse_result("make the header sticky"), ResultAction::Refine("make the header sticky".into()));
        assert_eq!(parse_result("  indent the nav  "), ResultAction::Refine("  indent the nav  ".into()));
        assert_eq!(parse_result(":s"), ResultAction::StartOver);
    }
}
