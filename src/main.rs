use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use jxt_xmpp::config::{InspectConfig, Overrides};
use jxt_xmpp::inspect;

// Inspect XMPP stanzas against the stock definitions.
//
// Usage:
//   jxt parse stanza.xml                        # JSON view of a stanza
//   cat stanza.xml | jxt parse                  # same, from stdin
//   jxt build message --data '{"body": "hi"}'   # XML from a data object
//   jxt describe roster                         # fields of one definition

#[derive(Parser)]
#[command(name = "jxt")]
#[command(about = "XMPP stanza definition inspector")]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// Plugin to leave out of the registry (repeatable)
    #[arg(long = "disable", value_name = "PLUGIN")]
    disable: Vec<String>,

    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Parse {
        /// XML file, or `-` for stdin
        file: Option<PathBuf>,
    },
    Build {
        name: String,
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
    Describe {
        name: Option<String>,
    },
}

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

fn run(cli: Cli) -> Result<(), anyhow::Error> {
    let config = InspectConfig::load(cli.config.as_deref())?.apply(Overrides {
        compact: cli.compact,
        disable: cli.disable,
        log_level: cli.log_level,
    });
    init_logging(config.log_level.as_deref());

    let registry = inspect::registry_for(&config)?;
    match cli.command {
        Commands::Parse { file } => {
            let xml = inspect::read_input(file.as_deref())?;
            let view = inspect::parse(&registry, &xml)?;
            println!("{}", inspect::render(&view, config.pretty)?);
        }
        Commands::Build { name, data } => {
            println!("{}", inspect::build(&registry, &name, &data)?);
        }
        Commands::Describe { name } => {
            let description = inspect::describe(&registry, name.as_deref())?;
            println!("{}", inspect::render(&description, config.pretty)?);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("jxt: {e:#}");
        std::process::exit(1);
    }
}
