use colored::*;
use domain::{CompletedResult, FailedResult, Job, JobResult, JobSnapshot};
use std::fmt::{self, Write};

pub fn print_job(job: &Job) {
    println!(
        "{} Submitted job {} ({})",
        "✓".green(),
        job.id.as_str().bold(),
        job.status
    );
}

pub fn print_snapshot(job_id: &str, snapshot: &JobSnapshot) {
    let status = if snapshot.status.is_terminal() {
        snapshot.status.as_str().green().bold()
    } else {
        snapshot.status.as_str().yellow()
    };
    println!("Job {}: {} ({}%)", job_id.bold(), status, snapshot.progress);
}

pub fn print_result(result: &JobResult) -> Result<(), fmt::Error> {
    print!("{}", render_result(result)?);
    Ok(())
}

pub fn render_result(result: &JobResult) -> Result<String, fmt::Error> {
    match result {
        JobResult::Completed(completed) => {
            let mut out = String::new();
            write_completed(&mut out, completed)?;
            Ok(out)
        }
        JobResult::Failed(failed) => Ok(render_failed(failed)),
    }
}

fn render_failed(failed: &FailedResult) -> String {
    format!(
        "{} Job {} failed at {}%: {}\n",
        "✗".red(),
        failed.job_id.as_str().bold(),
        failed.progress,
        failed.summary()
    )
}

fn write_completed(out: &mut String, result: &CompletedResult) -> fmt::Result {
    writeln!(
        out,
        "{} Job {} completed",
        "✓".green(),
        result.job_id.as_str().bold()
    )?;

    if let Some(summary) = &result.summary {
        section(out, "SUMMARY")?;
        if let Some(text) = &summary.text {
            writeln!(out, "{}", text)?;
        }
        bullets(out, "Key points", &summary.key_points)?;
        bullets(out, "Decisions", &summary.decisions)?;
        bullets(out, "Next steps", &summary.next_steps)?;
    }

    if !result.topics.is_empty() {
        section(out, "TOPICS")?;
        for topic in &result.topics {
            match topic.relevance {
                Some(relevance) => {
                    writeln!(out, "- {} [{}/10]", topic.name.bold(), relevance)?;
                }
                None => {
                    writeln!(out, "- {}", topic.name.bold())?;
                }
            }
            if let Some(description) = &topic.description {
                writeln!(out, "  {}", description.dimmed())?;
            }
            if !topic.keywords.is_empty() {
                writeln!(out, "  keywords: {}", topic.keywords.join(", "))?;
            }
        }
    }

    if !result.action_items.is_empty() {
        section(out, "ACTION ITEMS")?;
        for item in &result.action_items {
            write!(out, "- {}", item.description)?;
            if let Some(assignee) = &item.assignee {
                write!(out, " ({})", assignee.cyan())?;
            }
            if let Some(due_date) = &item.due_date {
                write!(out, " due {}", due_date)?;
            }
            writeln!(out)?;
        }
    }

    if let Some(sentiment) = &result.sentiment {
        section(out, "SENTIMENT")?;
        let overall = sentiment.overall.as_deref().unwrap_or("unknown");
        match sentiment.score {
            Some(score) => {
                writeln!(out, "{} ({})", overall, score)?;
            }
            None => {
                writeln!(out, "{}", overall)?;
            }
        }
    }

    if let Some(documents) = &result.retrieved_documents {
        section(out, "RETRIEVED CONTEXT")?;
        for doc in documents {
            let source = doc.source.as_deref().unwrap_or("untitled");
            match doc.score {
                Some(score) => {
                    writeln!(out, "- {} ({:.2})", source.bold(), score)?;
                }
                None => {
                    writeln!(out, "- {}", source.bold())?;
                }
            }
        }
    }

    Ok(())
}

fn section(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "\n{}", format!("=== {} ===", title).bright_white().bold())
}

fn bullets(out: &mut String, label: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}:", label.bold())?;
    for item in items {
        writeln!(out, "  - {}", item)?;
    }
    Ok(())
}
