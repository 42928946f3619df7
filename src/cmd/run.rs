//! Commands that drive the workflow: start, advance, recover, watch.

use anyhow::{Result, anyhow};
use console::style;

use specloom::catalog::Role;
use specloom::config::Config;
use specloom::engine::Engine;

pub fn cmd_start(config: &Config, project_id: &str) -> Result<()> {
    let engine = Engine::new(config.clone());
    match engine.start_work(project_id)? {
        None => println!("No status record for project {project_id}"),
        Some(record) => println!(
            "{} now at {}",
            style("started").green(),
            style(&record.current_phase_key).cyan()
        ),
    }
    Ok(())
}

pub fn cmd_advance(config: &Config, project_id: &str, role: &str, phase: &str) -> Result<()> {
    let role = Role::parse(role).ok_or_else(|| anyhow!("Unknown role: {role}"))?;

    let engine = Engine::new(config.clone());
    let before = engine.store().read(project_id)?.map(|r| r.current_phase_key);
    match engine.complete_and_advance(project_id, role, phase)? {
        None => println!("No status record for project {project_id}"),
        Some(record) => {
            if before.as_deref() == Some(record.current_phase_key.as_str()) {
                println!(
                    "{} request did not match current position {}",
                    style("dropped").yellow(),
                    style(&record.current_phase_key).cyan()
                );
            } else {
                println!(
                    "{} now at {}",
                    style("advanced").green(),
                    style(&record.current_phase_key).cyan()
                );
            }
        }
    }
    Ok(())
}

pub fn cmd_recover(config: &Config, project_id: &str) -> Result<()> {
    let engine = Engine::new(config.clone());
    match engine.recover_stale_phase(project_id)? {
        None => println!("No status record for project {project_id}"),
        Some(record) => println!(
            "Now at {}",
            style(&record.current_phase_key).cyan()
        ),
    }
    Ok(())
}

pub async fn cmd_watch(config: &Config) -> Result<()> {
    let engine = Engine::new(config.clone());
    println!(
        "Watching {} (Ctrl-C to stop)",
        config.projects_root.display()
    );
    specloom::watcher::watch_projects(&engine).await
}
