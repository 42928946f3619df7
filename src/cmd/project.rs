//! Project initialization and listing commands.

use anyhow::Result;
use walkdir::WalkDir;

use specloom::catalog::Role;
use specloom::config::Config;
use specloom::engine::Engine;
use specloom::status::StatusRecord;

pub fn cmd_init(config: &Config, project_id: &str) -> Result<()> {
    config.ensure_project_dirs(project_id)?;

    let engine = Engine::new(config.clone());
    if engine.store().read(project_id)?.is_some() {
        println!(
            "Project {} already initialized at {}",
            project_id,
            config.project_dir(project_id).display()
        );
        return Ok(());
    }

    let mut record = StatusRecord::new();
    engine.store().write(project_id, &mut record)?;

    println!(
        "Initialized project {} at {}",
        project_id,
        config.project_dir(project_id).display()
    );
    println!();
    println!("Created directory structure:");
    println!("  .specloom/status.json   # Progress record");
    for role in Role::ALL {
        println!("  {}/", role.as_str());
    }
    println!();
    println!("Next steps:");
    println!("  1. Run `specloom start {project_id}` before prompting the assistant");
    println!("  2. Run `specloom watch` to pick up artifacts as they land");

    Ok(())
}

pub fn cmd_list(config: &Config) -> Result<()> {
    let engine = Engine::new(config.clone());
    let mut found = false;

    for entry in WalkDir::new(&config.projects_root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
    {
        let Some(project_id) = entry.file_name().to_str() else {
            continue;
        };
        let Some(record) = engine.get_reconciled(project_id)? else {
            continue;
        };
        found = true;
        println!(
            "{:<24} {}",
            project_id,
            console::style(&record.current_phase_key).cyan()
        );
    }

    if !found {
        println!("No projects found under {}", config.projects_root.display());
    }
    Ok(())
}
