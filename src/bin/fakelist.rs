//! Demo host: runs one command line through an in-memory dispatch table.
//!
//! The binary plays the host's part. It builds a dispatch table, a caller
//! with the granted permissions and an optional real inventory, enables the
//! service against them and dispatches a single invocation. The reply is
//! printed as plain text or, with `--json`, as the rich text tree. Logs go to
//! stderr so stdout only carries the reply.

use anyhow::{Context, Result, anyhow, bail};
use fakelist::{
    DispatchTable, FakeListService, Host, JsonFileSource, MemoryDispatchTable, PermissionSet,
    StaticInventory,
};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse()?;
    init_logging(cli.verbose);

    let inventory = match &cli.inventory {
        Some(path) => StaticInventory::load(path)?,
        None => StaticInventory::default(),
    };
    let table = MemoryDispatchTable::new();
    let shared: Arc<dyn DispatchTable> = Arc::new(table.clone());
    let service = FakeListService::enable(
        JsonFileSource::new(&cli.config),
        Host::new(Ok(shared), Arc::new(inventory)),
    );

    let caller = cli
        .grants
        .iter()
        .fold(PermissionSet::new(cli.caller.as_str()), |caller, perm| {
            caller.grant(perm.as_str())
        });
    let reply = table.dispatch(&cli.command, &caller, &cli.args);
    let handled = match reply {
        Some(text) if cli.json => {
            let rendered =
                serde_json::to_string_pretty(&text).context("serializing reply as JSON")?;
            println!("{rendered}");
            true
        }
        Some(text) => {
            println!("{}", text.to_plain());
            true
        }
        None => {
            println!("Unknown command.");
            false
        }
    };

    service.disable();
    Ok(handled)
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct Cli {
    config: PathBuf,
    inventory: Option<PathBuf>,
    caller: String,
    grants: Vec<String>,
    json: bool,
    verbose: bool,
    command: String,
    args: Vec<String>,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut config = None;
        let mut inventory = None;
        let mut caller = "console".to_string();
        let mut grants = Vec::new();
        let mut json = false;
        let mut verbose = false;

        let command = loop {
            let Some(arg_os) = args.next() else {
                usage(1);
            };
            let arg = os_to_string(arg_os)?;
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(next_value(&mut args, "--config")?)),
                "--inventory" => {
                    inventory = Some(PathBuf::from(next_value(&mut args, "--inventory")?))
                }
                "--caller" => caller = next_value(&mut args, "--caller")?,
                "--grant" => grants.push(next_value(&mut args, "--grant")?),
                "--json" => json = true,
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => usage(0),
                other if other.starts_with("--") => bail!("Unknown flag {other}"),
                other => break other.trim_start_matches('/').to_string(),
            }
        };

        let Some(config) = config else {
            bail!("--config is required");
        };
        let args = args.map(os_to_string).collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            inventory,
            caller,
            grants,
            json,
            verbose,
            command,
            args,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    let value = args.next().ok_or_else(|| anyhow!("Missing value for {flag}"))?;
    os_to_string(value)
}

fn os_to_string(value: OsString) -> Result<String> {
    value
        .into_string()
        .map_err(|raw| anyhow!("Invalid UTF-8 in argument {}", raw.to_string_lossy()))
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: fakelist --config <file.json> [--inventory <file.json>] [--caller <name>] [--grant <permission>]... [--json] [--verbose] <command> [args...]\n\nRuns one command against an in-memory host and prints the reply.\n\nExamples:\n  fakelist --config config/default.json plugins\n  fakelist --config config/default.json plugins info WorldEdit\n  fakelist --config config/default.json --inventory config/inventory.json --grant fakepluginslist.real version"
    );
    std::process::exit(code);
}
