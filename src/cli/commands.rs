//! Command dispatch: one function per subcommand

use std::io;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::hash;
use crate::application::services::{MarkToggle, Navigation, PasteOperation};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, NavArgs, NavOrder};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output::{self, TerminalNotifier};
use crate::config::{global_config_path, Settings};
use crate::domain::{new_list, Bookmark, Direction, Location, NavigationSession, Node, NodeId};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::FixedLocationProvider;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Mark { name, at, list }) => _mark(cli, name, at, *list),
        Some(Commands::Unmark { at }) => _unmark(cli, at),
        Some(Commands::NewList { name, parent }) => _new_list(cli, name, *parent),
        Some(Commands::Rename { id, name }) => _rename(cli, *id, name),
        Some(Commands::Delete { id }) => _delete(cli, *id),
        Some(Commands::Active { id }) => _active(cli, *id),
        Some(Commands::Swap { a, b }) => _swap(cli, *a, *b),
        Some(Commands::Paste {
            id,
            into,
            position,
            copy,
        }) => _paste(cli, *id, *into, *position, *copy),
        Some(Commands::Detach { id, from }) => _detach(cli, *id, *from),
        Some(Commands::Attach { id, to }) => _attach(cli, *id, *to),
        Some(Commands::Next(args)) => _navigate(cli, args, Direction::Next),
        Some(Commands::Prev(args)) => _navigate(cli, args, Direction::Prev),
        Some(Commands::Visit { id }) => _visit(cli, *id),
        Some(Commands::Show { id }) => _show(cli, *id),
        Some(Commands::Tree { id }) => _tree(cli, *id),
        Some(Commands::Lists) => _lists(cli),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Ok(()),
    }
}

/// Wire services for one invocation; `at` becomes the current location.
fn container(cli: &Cli, at: Option<&Location>) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("store: {}", settings.store_path.display());
    let locations = Arc::new(FixedLocationProvider::new(at.cloned()));
    Ok(ServiceContainer::new(
        settings,
        locations,
        Arc::new(TerminalNotifier),
    )?)
}

#[instrument(skip(cli))]
fn _mark(cli: &Cli, name: &str, at: &Location, list: Option<NodeId>) -> CliResult<()> {
    let c = container(cli, Some(at))?;
    match c.bookmarks.toggle_mark(name, Some(at.clone()), list)? {
        MarkToggle::Created(b) => output::action("Created", &output::bookmark_line(&b)),
        MarkToggle::Renamed(b) => output::action("Renamed", &output::bookmark_line(&b)),
        MarkToggle::Removed(b) => output::action("Removed", &output::bookmark_line(&b)),
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _unmark(cli: &Cli, at: &Location) -> CliResult<()> {
    let c = container(cli, Some(at))?;
    let bookmark = c
        .bookmarks
        .bookmark_at(at)?
        .ok_or_else(|| CliError::Usage(format!("no bookmark at {at}")))?;
    let id = bookmark.require_id().map_err(ApplicationError::from)?;
    let removed = c.bookmarks.remove_bookmark(id)?;
    output::action("Removed", &output::bookmark_line(&removed));
    Ok(())
}

#[instrument(skip(cli))]
fn _new_list(cli: &Cli, name: &str, parent: Option<NodeId>) -> CliResult<()> {
    let c = container(cli, None)?;
    let list = c.bookmarks.new_list(new_list(name).into(), parent)?;
    output::action("Created", &output::list_line(&list, false));
    Ok(())
}

#[instrument(skip(cli))]
fn _rename(cli: &Cli, id: NodeId, name: &str) -> CliResult<()> {
    let c = container(cli, None)?;
    let node = c.bookmarks.rename_node(id, name)?;
    output::action("Renamed", &node);
    Ok(())
}

#[instrument(skip(cli))]
fn _delete(cli: &Cli, id: NodeId) -> CliResult<()> {
    let c = container(cli, None)?;
    let node = c.bookmarks.delete_node(id)?;
    output::action("Deleted", &node);
    Ok(())
}

#[instrument(skip(cli))]
fn _active(cli: &Cli, id: Option<NodeId>) -> CliResult<()> {
    let c = container(cli, None)?;
    match id {
        Some(id) => {
            let mut session = NavigationSession::new();
            let list = c.bookmarks.set_active_list(&mut session, id)?;
            output::action("Active", &output::list_line(&list, true));
        }
        None => output::info(&output::list_line(&c.bookmarks.active_list()?, true)),
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _swap(cli: &Cli, a: NodeId, b: NodeId) -> CliResult<()> {
    let c = container(cli, None)?;
    let (first, second) = c.bookmarks.switch_position(a, b)?;
    output::success(&format!("swapped {} and {}", first, second));
    Ok(())
}

#[instrument(skip(cli))]
fn _paste(cli: &Cli, id: NodeId, into: NodeId, position: i64, copy: bool) -> CliResult<()> {
    let c = container(cli, None)?;
    let operation = if copy {
        PasteOperation::Copy
    } else {
        PasteOperation::Cut
    };
    let node = c.bookmarks.paste_node(id, into, position, operation)?;
    let label = if copy { "Copied" } else { "Moved" };
    output::action(label, &node);
    Ok(())
}

#[instrument(skip(cli))]
fn _detach(cli: &Cli, id: NodeId, from: NodeId) -> CliResult<()> {
    let c = container(cli, None)?;
    c.bookmarks.remove_from_list(id, from)?;
    output::success(&format!("detached {} from list {}", id, from));
    Ok(())
}

#[instrument(skip(cli))]
fn _attach(cli: &Cli, id: NodeId, to: NodeId) -> CliResult<()> {
    let c = container(cli, None)?;
    let node = c.bookmarks.add_to_list(id, to)?;
    output::action("Attached", &node);
    Ok(())
}

/// Print the jump target: the location for editors, else the name.
fn print_target(bookmark: &Bookmark) {
    match &bookmark.location {
        Some(loc) => output::info(loc),
        None => output::info(&bookmark.name),
    }
}

#[instrument(skip(cli))]
fn _navigate(cli: &Cli, args: &NavArgs, direction: Direction) -> CliResult<()> {
    let c = container(cli, args.at.as_ref())?;
    let svc = &c.bookmarks;

    let result = match args.by {
        NavOrder::Id => {
            let active = svc.active_list()?.require_id().map_err(ApplicationError::from)?;
            let mut session = match args.from {
                Some(from) => NavigationSession::resume(active, from),
                None => NavigationSession::new(),
            };
            match direction {
                Direction::Next => svc.find_next_bookmark_id_order(&mut session, print_target)?,
                Direction::Prev => svc.find_prev_bookmark_id_order(&mut session, print_target)?,
            }
        }
        NavOrder::Line => match direction {
            Direction::Next => svc.find_next_bookmark_line_order(print_target)?,
            Direction::Prev => svc.find_prev_bookmark_line_order(print_target)?,
        },
    };

    if let Navigation::Selected(bookmark) = result {
        let id = bookmark.require_id().map_err(ApplicationError::from)?;
        svc.visit(id)?;
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _visit(cli: &Cli, id: NodeId) -> CliResult<()> {
    let c = container(cli, None)?;
    let bookmark = c.bookmarks.visit(id)?;
    output::action("Visited", &output::bookmark_line(&bookmark));
    Ok(())
}

#[instrument(skip(cli))]
fn _show(cli: &Cli, id: NodeId) -> CliResult<()> {
    let c = container(cli, None)?;
    match c.bookmarks.find_node(id)? {
        Node::Bookmark(b) => {
            output::info(&output::bookmark_line(&b));
            output::detail(&format!("created: {}", b.created_at.to_rfc3339()));
            output::detail(&format!("visited: {}", b.visited_at.to_rfc3339()));
            if let Some(description) = &b.description {
                output::detail(description);
            }
            if let (Some(loc), Some(expected)) = (&b.location, &b.content_hash) {
                if hash::is_unchanged(&loc.path, expected) {
                    output::detail("file unchanged since marked");
                } else {
                    output::warning(&format!("{} changed since marked", loc.path.display()));
                }
            }
        }
        Node::List(l) => {
            let active = c.bookmarks.active_list()?.id == l.id;
            output::info(&output::list_line(&l, active));
            output::detail(&format!("created: {}", l.created_at.to_rfc3339()));
            for child_id in &l.children {
                output::detail(&c.bookmarks.find_node(*child_id)?);
            }
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _tree(cli: &Cli, id: Option<NodeId>) -> CliResult<()> {
    let c = container(cli, None)?;
    let tree = c.bookmarks.render_tree(id)?;
    print!("{}", tree);
    Ok(())
}

#[instrument(skip(cli))]
fn _lists(cli: &Cli) -> CliResult<()> {
    let c = container(cli, None)?;
    let active = c.bookmarks.active_list()?.id;
    output::header("Lists");
    for list in c.bookmarks.lists()? {
        output::info(&output::list_line(&list, list.id == active));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path()
                .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::header("Config paths");
            match global_config_path() {
                Some(p) => output::detail(&format!("global:   {}", p.display())),
                None => output::detail("global:   (unavailable)"),
            }
            if let Some(p) = &cli.config {
                output::detail(&format!("explicit: {}", p.display()));
            }
            output::detail(&format!("store:    {}", settings.store_path.display()));
        }
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "marktree", &mut io::stdout());
    Ok(())
}
