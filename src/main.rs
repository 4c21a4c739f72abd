use anyhow::Result;
use clap::Parser;
use policy_book::commands::describe_client;
use policy_book::{
    BookError, CommandResult, Config, LineError, Logic, Model, ParseContext, ParseError,
    StorageBackend, View,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "policy-book", version, about = "Keep track of clients, policies and claims")]
struct Args {
    /// JSON config file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Overrides `data_file` from the config
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Overrides `storage` from the config
    #[arg(long, value_enum)]
    storage: Option<StorageBackend>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }
    if let Some(storage) = args.storage {
        config.storage = storage;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log_filter))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut logic = Logic::start(&config)?;
    println!(
        "📒 Policy Book v{} ({} storage at {})",
        policy_book::VERSION,
        config.storage.as_str(),
        logic.storage_location().display()
    );
    println!("   Type `help` for the command list, `exit` to save and quit.\n");

    run_repl(&mut logic, &config)?;

    logic.shutdown()?;
    println!("💾 Saved to {}", logic.storage_location().display());
    Ok(())
}

fn run_repl(logic: &mut Logic, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        // EOF behaves like `exit`
        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line?;

        let context = ParseContext {
            today: chrono::Local::now().date_naive(),
            reminder_window_days: config.reminder_window_days,
        };

        match logic.execute_line(&line, &context) {
            Ok(result) => {
                print_result(logic.model(), &result);
                if result.exit {
                    return Ok(());
                }
            }
            Err(LineError::Parse(ParseError::Empty)) => {}
            Err(LineError::Parse(ParseError::Invalid(e))) => {
                // clap renders its own usage and help text
                println!("{}", e.render());
            }
            Err(LineError::Parse(e)) => println!("❌ {}", e),
            Err(LineError::Book(BookError::Ambiguous(candidates))) => {
                println!("❌ No policy type matches both name and id; partial matches:");
                for policy_type in candidates {
                    println!("   • {}", policy_type);
                }
            }
            Err(LineError::Book(e)) => println!("❌ {}", e),
        }
    }
}

fn print_result(model: &Model, result: &CommandResult) {
    println!("✓ {}", result.feedback);

    match &result.view {
        Some(View::ClientList) => {
            let clients = model.filtered_clients();
            if clients.is_empty() {
                println!("   (no clients)");
            }
            for (i, client) in clients.iter().enumerate() {
                println!("   {}. {}", i + 1, client);
            }
        }
        Some(View::ClientDetail(id)) => {
            if let Ok(client) = model.book().client(id) {
                for line in describe_client(client).lines() {
                    println!("   {}", line);
                }
            }
        }
        Some(View::PolicyTypeList) => {
            let policy_types = model.filtered_policy_types();
            if policy_types.is_empty() {
                println!("   (no policy types)");
            }
            for (i, policy_type) in policy_types.iter().enumerate() {
                println!("   {}. {}", i + 1, policy_type);
            }
        }
        Some(View::Reminders) | None => {}
    }
}
