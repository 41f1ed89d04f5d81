use anyhow::{anyhow, bail, Context as _};
use chrono::{Duration, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{self, Write};

use crate::backend::auth::mint_custom_token;
use crate::backend::Backend;
use crate::binding::TaskBinding;
use crate::config::Config;
use crate::deadline;
use crate::gateway::{Outcome, TaskGateway};
use crate::models::Task;
use crate::session::{IdentitySession, SessionState};
use crate::urgency::{deadline_status, DeadlineStatus};

/// Everything a CLI command needs, passed in explicitly.
pub struct Context {
    pub backend: Backend,
    pub config: Config,
}

/// A ready session, kept alive for the duration of one command.
struct Signed {
    _session: IdentitySession,
    state: SessionState,
}

async fn sign_in(ctx: &Context) -> anyhow::Result<Signed> {
    let mut session = IdentitySession::start(ctx.backend.auth.clone(), ctx.config.custom_token.clone());
    let state = session.settled().await;
    if !state.ready {
        bail!("Not signed in: sign-in failed (see log)");
    }
    Ok(Signed { _session: session, state })
}

fn gateway(ctx: &Context, signed: &Signed) -> TaskGateway {
    TaskGateway::new(ctx.backend.store.clone(), &ctx.config.app_id, &signed.state)
}

/// Current contents of the user's collection, newest first.
async fn snapshot(ctx: &Context, signed: &Signed) -> anyhow::Result<Vec<Task>> {
    let mut binding = TaskBinding::new(ctx.backend.store.clone(), ctx.config.app_id.clone());
    binding.bind(&signed.state).await;
    if !binding.next_snapshot().await {
        bail!("Could not read tasks (see log)");
    }
    Ok(binding.tasks().to_vec())
}

/// Finds a task by full id or unique id prefix.
pub fn resolve_id<'a>(tasks: &'a [Task], id: &str) -> anyhow::Result<&'a Task> {
    if let Some(t) = tasks.iter().find(|t| t.id == id) {
        return Ok(t);
    }
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(id)).collect();
    match matches.as_slice() {
        [t] => Ok(t),
        [] => Err(anyhow!("Task {} not found.", id)),
        _ => Err(anyhow!("Task id {} is ambiguous ({} matches).", id, matches.len())),
    }
}

fn settle(outcome: Outcome, what: &str) -> anyhow::Result<()> {
    match outcome {
        Outcome::Applied | Outcome::Created(_) => Ok(()),
        Outcome::Rejected => bail!("Refused to {}.", what),
        Outcome::Failed => bail!("Failed to {} (see log).", what),
    }
}

/// Adds a new task.
pub async fn cmd_add(ctx: &Context, title: String, description: Option<String>, due: Option<String>) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        bail!("Task title must not be empty.");
    }
    let deadline = match due {
        Some(d) => deadline::parse_input(&d)?,
        None => None,
    };
    let signed = sign_in(ctx).await?;
    match gateway(ctx, &signed).create(&title, description, deadline).settled().await {
        Outcome::Created(task) => {
            println!("Task added (id = {})", task.short_id());
            Ok(())
        }
        other => settle(other, "add task"),
    }
}

/// Lists tasks newest first. Completed tasks are hidden unless `all`.
pub async fn cmd_list(ctx: &Context, all: bool) -> anyhow::Result<()> {
    let signed = sign_in(ctx).await?;
    let mut tasks = snapshot(ctx, &signed).await?;
    if !all {
        tasks.retain(|t| !t.completed);
    }
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
            Cell::new("Deadline").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
        ]);

    let now = Utc::now();
    for t in &tasks {
        let (status, status_color) = if t.completed {
            ("Done", Color::Green)
        } else {
            match deadline_status(t, now) {
                DeadlineStatus::Overdue => ("Overdue", Color::Red),
                DeadlineStatus::DueSoon => ("Due soon", Color::Yellow),
                DeadlineStatus::Clear => ("Open", Color::Reset),
            }
        };

        table.add_row(vec![
            Cell::new(t.short_id()),
            Cell::new(&t.title),
            Cell::new(t.description.clone().unwrap_or_default()),
            Cell::new(t.deadline.as_ref().map(deadline::display).unwrap_or_default()),
            Cell::new(status).fg(status_color),
            Cell::new(deadline::display(&t.created_at)),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Marks a task complete, or open again with `undo`.
pub async fn cmd_done(ctx: &Context, id: String, undo: bool) -> anyhow::Result<()> {
    let signed = sign_in(ctx).await?;
    let tasks = snapshot(ctx, &signed).await?;
    let task = resolve_id(&tasks, &id)?;
    let outcome = gateway(ctx, &signed).toggle_completion(&task.id, !undo).settled().await;
    settle(outcome, "update task")?;
    if undo {
        println!("Task {} reopened.", task.short_id());
    } else {
        println!("Task {} marked as complete.", task.short_id());
    }
    Ok(())
}

/// Edits a task. Fields that are not given keep their current value.
pub async fn cmd_edit(
    ctx: &Context,
    id: String,
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    clear_due: bool,
) -> anyhow::Result<()> {
    let signed = sign_in(ctx).await?;
    let tasks = snapshot(ctx, &signed).await?;
    let task = resolve_id(&tasks, &id)?;

    let title = title.unwrap_or_else(|| task.title.clone());
    if title.trim().is_empty() {
        bail!("Task title must not be empty.");
    }
    let description = description.or_else(|| task.description.clone());
    let deadline = if clear_due {
        None
    } else {
        match due {
            Some(d) => deadline::parse_input(&d)?,
            None => task.deadline,
        }
    };

    let outcome = gateway(ctx, &signed)
        .update(&task.id, &title, description, deadline, task.completed)
        .settled()
        .await;
    settle(outcome, "update task")?;
    println!("Task {} updated.", task.short_id());
    Ok(())
}

/// Removes a task, asking first unless `force`.
pub async fn cmd_remove(ctx: &Context, id: String, force: bool) -> anyhow::Result<()> {
    let signed = sign_in(ctx).await?;
    let tasks = snapshot(ctx, &signed).await?;
    let task = resolve_id(&tasks, &id)?;

    if !force {
        print!("Delete \"{}\"? This cannot be undone. [y/N] ", task.title);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }

    let outcome = gateway(ctx, &signed).delete(&task.id).settled().await;
    settle(outcome, "remove task")?;
    println!("Task {} removed.", task.short_id());
    Ok(())
}

/// Prints the signed-in identity and its collection path.
pub async fn cmd_whoami(ctx: &Context) -> anyhow::Result<()> {
    let signed = sign_in(ctx).await?;
    let gateway = gateway(ctx, &signed);
    if let (Some(user), Some(path)) = (signed.state.user.as_ref(), gateway.path()) {
        println!("uid:        {}", user.uid);
        println!("anonymous:  {}", user.is_anonymous);
        println!("collection: {}", path);
    }
    Ok(())
}

/// Prints a custom token for `uid`, signed with the configured secret.
pub fn cmd_token(config: &Config, uid: String, hours: i64) -> anyhow::Result<()> {
    if uid.trim().is_empty() {
        bail!("uid must not be empty.");
    }
    let token = mint_custom_token(&config.token_secret, &uid, Duration::hours(hours))
        .context("Failed to sign token")?;
    println!("{}", token);
    Ok(())
}
