//! hcs-review - Read-only measurement database inspection tool
//!
//! Loads a saved measurement database and prints its contents: namespaces
//! and features, registered image sets, individual value columns and
//! metadata groupings. Never writes.

use anyhow::Result;
use clap::{Parser, Subcommand};
use hcs_common::config::resolve_database_path;
use hcs_common::db::load_measurements;
use hcs_common::{Store, EXIT_STATUS};
use tracing::info;

#[derive(Parser)]
#[command(name = "hcs-review", version, about = "Inspect a saved HCS measurement database")]
struct Cli {
    /// Measurement database path (falls back to env var, config file,
    /// then the platform default)
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Namespaces, feature counts and registered image sets
    Summary,
    /// List registered image numbers
    Images,
    /// List feature names recorded under a namespace
    Features { object: String },
    /// Print every value of one feature, ascending by image number
    Values { object: String, feature: String },
    /// Group registered image sets by comma-separated metadata keys
    Groups { keys: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting HCS Measurement Review (hcs-review) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let cli = Cli::parse();
    let db_path = resolve_database_path(cli.db.as_deref());
    info!("Database path: {}", db_path.display());

    let store = load_measurements(&db_path).await?;

    match cli.command {
        Command::Summary => print_summary(&store),
        Command::Images => {
            for image_number in store.get_image_numbers() {
                println!("{}", image_number);
            }
        }
        Command::Features { object } => {
            let mut features = store.get_feature_names(&object);
            features.sort_unstable();
            for feature in features {
                println!("{}", feature);
            }
        }
        Command::Values { object, feature } => print_values(&store, &object, &feature),
        Command::Groups { keys } => print_groups(&store, &keys),
    }

    Ok(())
}

fn print_summary(store: &Store) {
    println!("image sets: {}", store.get_image_numbers().len());
    if let Some(status) = store.get_experiment_measurement(EXIT_STATUS) {
        println!("exit status: {}", status);
    }
    let mut objects = store.get_object_names();
    objects.sort_unstable();
    for object in objects {
        println!(
            "{}: {} features",
            object,
            store.get_feature_names(object).len()
        );
    }
}

fn print_values(store: &Store, object: &str, feature: &str) {
    let mut cells: Vec<(u32, String)> = store
        .iter_cells()
        .filter(|(o, f, _, _)| *o == object && *f == feature)
        .map(|(_, _, image_number, value)| (image_number, value.to_string()))
        .collect();
    cells.sort_unstable_by_key(|(image_number, _)| *image_number);
    for (image_number, value) in cells {
        println!("{}\t{}", image_number, value);
    }
}

fn print_groups(store: &Store, keys: &str) {
    let key_list: Vec<&str> = keys.split(',').filter(|k| !k.is_empty()).collect();
    for group in store.group_by_metadata(&key_list) {
        let tuple: Vec<String> = group
            .values()
            .iter()
            .map(|(key, value)| match value {
                Some(v) => format!("{}={}", key, v),
                None => format!("{}=<absent>", key),
            })
            .collect();
        let members: Vec<String> = group
            .image_numbers()
            .iter()
            .map(|n| n.to_string())
            .collect();
        println!("{}\t[{}]", tuple.join(","), members.join(", "));
    }
}
