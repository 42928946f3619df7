//! Status, reconcile, and drift diagnostic commands.

use anyhow::Result;
use console::style;

use specloom::catalog::Role;
use specloom::config::Config;
use specloom::engine::Engine;
use specloom::status::{PhaseStatus, StatusRecord};

pub fn cmd_status(config: &Config, project_id: &str) -> Result<()> {
    let engine = Engine::new(config.clone());
    let Some(record) = engine.get_reconciled(project_id)? else {
        println!("No status record for project {project_id}");
        return Ok(());
    };
    print_record(project_id, &record);
    Ok(())
}

pub fn cmd_reconcile(config: &Config, project_id: &str) -> Result<()> {
    let engine = Engine::new(config.clone());
    let outcome = engine.reconcile(project_id)?;

    match (&outcome.status, outcome.had_drift) {
        (None, _) => println!("No status record for project {project_id}"),
        (Some(_), false) => println!("{} no drift detected", style("ok").green()),
        (Some(record), true) => {
            println!(
                "{} repaired {} drifted phase(s):",
                style("drift").yellow(),
                outcome.drift.len()
            );
            for entry in &outcome.drift {
                println!("  {} {}", style(&entry.rule_id).cyan(), entry.description);
            }
            println!("Now at {}", style(&record.current_phase_key).cyan());
        }
    }
    Ok(())
}

pub fn cmd_drift(config: &Config, project_id: &str) -> Result<()> {
    let engine = Engine::new(config.clone());
    let drift = engine.check_for_drift(project_id)?;
    if drift.is_empty() {
        println!("{} no drift detected", style("ok").green());
    } else {
        println!("{} {} phase(s) would be downgraded:", style("drift").yellow(), drift.len());
        for entry in &drift {
            println!("  {} {}", style(&entry.rule_id).cyan(), entry.description);
        }
    }
    Ok(())
}

fn print_record(project_id: &str, record: &StatusRecord) {
    println!(
        "{}: {}",
        style(project_id).bold(),
        style(&record.current_phase_key).cyan()
    );
    println!("Last updated {}", record.last_updated_at.to_rfc3339());
    println!();

    for role in Role::ALL {
        let Some(rs) = record.roles.get(&role) else {
            continue;
        };
        println!("{:<12} {:?}", style(role.as_str()).bold(), rs.status);
        for &phase in specloom::catalog::phases_for(role) {
            let Some(pr) = rs.phases.get(phase) else {
                continue;
            };
            let marker = match pr.status {
                PhaseStatus::Complete => style("done").green(),
                PhaseStatus::AiWorking => style("working").yellow(),
                PhaseStatus::AwaitingUser | PhaseStatus::UserReviewing => {
                    style("waiting").magenta()
                }
                PhaseStatus::NotStarted => style("-").dim(),
            };
            println!("  {:<20} {}", phase, marker);
        }
    }
}
