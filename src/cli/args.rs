//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{Location, NodeId};

/// Hierarchical bookmarks for source locations: lists, ordering and next/prev navigation
#[derive(Parser, Debug)]
#[command(name = "marktree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file layered on top of the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Navigation ordering for `next`/`prev`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavOrder {
    /// Bookmark order within the active list, circular
    #[default]
    Id,
    /// Line position within the current file
    Line,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Toggle a bookmark at a location: create, rename, or remove (empty name)
    Mark {
        /// Bookmark name; empty removes an existing bookmark
        #[arg(default_value = "")]
        name: String,
        /// Location as PATH:LINE[:COL]
        #[arg(long)]
        at: Location,
        /// Parent list (default: active list)
        #[arg(long)]
        list: Option<NodeId>,
    },

    /// Remove the bookmark at a location
    Unmark {
        /// Location as PATH:LINE[:COL]
        #[arg(long)]
        at: Location,
    },

    /// Create a list
    NewList {
        name: String,
        /// Parent list (default: active list)
        #[arg(long)]
        parent: Option<NodeId>,
    },

    /// Rename a bookmark or list
    Rename { id: NodeId, name: String },

    /// Delete a bookmark or list (lists are deleted with their contents)
    Delete { id: NodeId },

    /// Show the active list, or activate another one
    Active { id: Option<NodeId> },

    /// Swap the order of two siblings
    Swap { a: NodeId, b: NodeId },

    /// Move (or copy) a node into a list at a position
    Paste {
        id: NodeId,
        /// Target list
        #[arg(long)]
        into: NodeId,
        /// Order value the pasted node takes
        #[arg(long, default_value_t = 0)]
        position: i64,
        /// Insert a duplicate instead of moving
        #[arg(long)]
        copy: bool,
    },

    /// Detach a node from a list without deleting it
    Detach {
        id: NodeId,
        #[arg(long)]
        from: NodeId,
    },

    /// Append a node to a list, moving it from its current parent
    Attach {
        id: NodeId,
        #[arg(long)]
        to: NodeId,
    },

    /// Jump to the next bookmark
    Next(NavArgs),

    /// Jump to the previous bookmark
    Prev(NavArgs),

    /// Record a visit to a bookmark
    Visit { id: NodeId },

    /// Show a node, flagging bookmarks whose file changed since marking
    Show { id: NodeId },

    /// Print the bookmark tree
    Tree {
        /// List to print (default: root)
        id: Option<NodeId>,
    },

    /// List all lists
    Lists,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Debug)]
pub struct NavArgs {
    #[arg(long, value_enum, default_value_t = NavOrder::Id)]
    pub by: NavOrder,

    /// Current location as PATH:LINE[:COL] (required for --by line)
    #[arg(long)]
    pub at: Option<Location>,

    /// Bookmark to continue from (id order)
    #[arg(long)]
    pub from: Option<NodeId>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_mark_args_when_parsing_then_location_is_parsed() {
        let cli = Cli::parse_from(["marktree", "mark", "todo", "--at", "src/main.rs:12:4"]);
        match cli.command {
            Some(Commands::Mark { name, at, list }) => {
                assert_eq!(name, "todo");
                assert_eq!(at, Location::new("src/main.rs", 12, 4));
                assert_eq!(list, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_repeated_debug_flags_when_parsing_then_counts() {
        let cli = Cli::parse_from(["marktree", "-dd", "lists"]);
        assert_eq!(cli.debug, 2);
    }

    #[test]
    fn given_next_without_by_when_parsing_then_defaults_to_id_order() {
        let cli = Cli::parse_from(["marktree", "next", "--from", "3"]);
        match cli.command {
            Some(Commands::Next(args)) => {
                assert_eq!(args.by, NavOrder::Id);
                assert_eq!(args.from, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
