//! Command line parsing

use thiserror::Error;

pub const USAGE: &str = "\
Usage: context_shell [OPTIONS] <PATH>

Build the context menu of PATH over the demo storage and print it.

Options:
  --url <URL>             Target url (defaults to PATH; differs for .url shortcuts)
  --pid <PROCESS>         Process that opens the entry
  --focused <A,B,...>     Base names focused in the containing view
  --file-manager <ID>     Id of the file manager window hosting the entry
  --read-only             The containing view is read-only
  --ai                    Enable the session AI flag
  --invoke <LABEL/...>    Activate the entry at this label path
  --json                  Print the menu as JSON
  -h, --help              Print help
  -V, --version           Print version";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MenuArgs {
    pub path: String,
    pub url: Option<String>,
    pub pid: String,
    pub focused: Vec<String>,
    pub file_manager: Option<String>,
    pub read_only: bool,
    pub ai: bool,
    pub invoke: Option<Vec<String>>,
    pub json: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Menu(MenuArgs),
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("missing path")]
    MissingPath,
}

/// Parse `args` without the program name
pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut menu = MenuArgs::default();
    let mut path: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| CliParseError::MissingFlagValue(flag.to_string()))
        };
        match arg.as_str() {
            "--url" => menu.url = Some(value("--url")?),
            "--pid" => menu.pid = value("--pid")?,
            "--focused" => {
                menu.focused = value("--focused")?
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "--file-manager" => menu.file_manager = Some(value("--file-manager")?),
            "--invoke" => {
                menu.invoke = Some(
                    value("--invoke")?
                        .split('/')
                        .map(str::to_string)
                        .collect(),
                );
            }
            "--read-only" => menu.read_only = true,
            "--ai" => menu.ai = true,
            "--json" => menu.json = true,
            _ if arg.starts_with('-') => return Err(CliParseError::UnknownFlag(arg.clone())),
            _ => {
                if path.is_some() {
                    return Err(CliParseError::UnexpectedArgument(arg.clone()));
                }
                path = Some(arg.clone());
            }
        }
    }

    menu.path = path.ok_or(CliParseError::MissingPath)?;
    Ok(CliInvocation::Menu(menu))
}
