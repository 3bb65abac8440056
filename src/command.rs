//! Command kinds and argument grammar.
//!
//! Every exposed label resolves to one of three kinds. [`Request::parse`]
//! turns the raw argument list into the view or action to perform; the
//! service then answers it with exactly one message.

use serde::Serialize;

pub const VERSION_COMMANDS: [&str; 2] = ["version", "ver"];
pub const ADMIN_COMMAND: &str = "fakepluginslist";
pub const RELOAD_PERMISSION: &str = "fakepluginslist.reload";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    /// Configured list commands: list, `info <name>`, `reload`.
    List,
    /// `version` / `ver` invocations, optionally for one plugin.
    Version,
    /// The plugin's own administrative command.
    Admin,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::List => "list-command",
            CommandKind::Version => "version-command",
            CommandKind::Admin => "admin-command",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    List,
    Reload,
    Info(String),
    VersionAll,
    VersionOf(String),
    AdminUsage,
}

impl Request {
    pub fn parse(kind: CommandKind, args: &[String]) -> Self {
        let first = args.first().map(String::as_str);
        match kind {
            CommandKind::List => match first {
                Some(arg) if arg.eq_ignore_ascii_case("reload") => Request::Reload,
                Some(arg) if arg.eq_ignore_ascii_case("info") => {
                    Request::Info(join_args(args, 1))
                }
                _ => Request::List,
            },
            CommandKind::Version => {
                if args.is_empty() {
                    Request::VersionAll
                } else {
                    Request::VersionOf(join_args(args, 0))
                }
            }
            CommandKind::Admin => match first {
                Some(arg) if arg.eq_ignore_ascii_case("reload") => Request::Reload,
                _ => Request::AdminUsage,
            },
        }
    }
}

/// Join `args[start..]` with single spaces; empty when out of range.
pub fn join_args(args: &[String], start: usize) -> String {
    args.get(start..).map(|rest| rest.join(" ")).unwrap_or_default()
}
