use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use crate::config::Config;
use crate::error::MigrateError;
use crate::migrator::Migrator;
use crate::schema::SourceSchemaVariant;
use crate::store::{DestinationStore, SourceStore};

pub const COMPLETION_MESSAGE: &str = "Migration completed successfully.";

#[derive(Parser)]
#[command(
    name = "monitor-migrate",
    version,
    about = "Copy monitored_users records from an older bot database into the current schema"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Migrate every record from the source store into the destination store
    Migrate {
        /// Layout of the source table: "eight-column" (8) or "ten-column" (10)
        #[arg(long = "from", short = 'f')]
        variant: SourceSchemaVariant,

        /// Source database file (default from config: bot-old.db)
        #[arg(long = "source", short = 's')]
        source: Option<PathBuf>,

        /// Destination database file (default from config: bot.db)
        #[arg(long = "destination", short = 'd')]
        destination: Option<PathBuf>,
    },

    /// Create the destination monitored_users table if it does not exist
    #[command(name = "ensure-schema")]
    EnsureSchema {
        /// Destination database file (default from config: bot.db)
        #[arg(long = "destination", short = 'd')]
        destination: Option<PathBuf>,
    },

    /// Describe the source monitored_users table without changing anything
    Inspect {
        /// Source database file (default from config: bot-old.db)
        #[arg(long = "source", short = 's')]
        source: Option<PathBuf>,
    },
}

impl Cli {
    pub fn handle_command_line(config: &Config) -> Result<(), MigrateError> {
        let args = Cli::parse();
        args.execute(config)
    }

    pub fn execute(self, config: &Config) -> Result<(), MigrateError> {
        match self.command {
            Command::Migrate {
                variant,
                source,
                destination,
            } => {
                let source = source.unwrap_or_else(|| config.stores.source.clone());
                let destination = destination.unwrap_or_else(|| config.stores.destination.clone());
                Self::migrate(config, variant, source, destination)
            }
            Command::EnsureSchema { destination } => {
                let destination = destination.unwrap_or_else(|| config.stores.destination.clone());
                Self::ensure_schema(config, destination)
            }
            Command::Inspect { source } => {
                let source = source.unwrap_or_else(|| config.stores.source.clone());
                Self::inspect(source)
            }
        }
    }

    fn migrate(
        config: &Config,
        variant: SourceSchemaVariant,
        source: PathBuf,
        destination: PathBuf,
    ) -> Result<(), MigrateError> {
        let source = SourceStore::open(&source)?;
        let mut destination = DestinationStore::open(&destination, config.stores.busy_timeout())?;

        let report = Migrator::new(&source, &mut destination, variant).run()?;
        info!(
            "Migrated {} of {} records ({}), captured_at={}",
            report.rows_inserted, report.rows_read, report.variant, report.captured_at
        );

        source.close()?;
        destination.close()?;

        println!("{}", COMPLETION_MESSAGE);
        Ok(())
    }

    fn ensure_schema(config: &Config, destination: PathBuf) -> Result<(), MigrateError> {
        let destination = DestinationStore::open(&destination, config.stores.busy_timeout())?;
        let existed = destination.has_monitored_users()?;
        destination.ensure_schema()?;
        if existed {
            info!(
                "monitored_users already present in {}, left unchanged",
                destination.path().display()
            );
        } else {
            info!("Created monitored_users in {}", destination.path().display());
        }
        destination.close()
    }

    fn inspect(source: PathBuf) -> Result<(), MigrateError> {
        let source = SourceStore::open(&source)?;
        if !source.has_monitored_users()? {
            println!("{}: no monitored_users table", source.path().display());
            return source.close();
        }

        let columns = source.column_names()?;
        let rows = source.row_count()?;
        println!("Source: {}", source.path().display());
        println!("Columns ({}): {}", columns.len(), columns.join(", "));
        println!("Rows: {}", rows);
        match SourceSchemaVariant::detect(columns.len()) {
            Some(variant) => println!("Layout matches: {}", variant),
            None => println!("Layout matches: none (expected 8 or 10 columns)"),
        }

        source.close()
    }
}
