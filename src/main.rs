use clap::{Parser, Subcommand, ValueEnum};
use group_former::config;
use group_former::error::{EXIT_CONFIG, EXIT_INVALID_ARGUMENT, EXIT_SUCCESS};
use group_former::output;
use group_former::scoring::{group_size_from, PartitionSummary};
use group_former::storage::{default_data_path, JsonFileStore, NewSubmission};
use group_former::{GroupingEngine, GroupingError, Partition};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum Format {
    /// Aligned table, colored on a terminal
    #[default]
    Table,
    /// Tab-separated participant ids, one group per line
    Tsv,
    /// JSON array of arrays
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record one participant's answers for a survey
    Submit {
        #[arg(short, long)]
        survey: i64,
        #[arg(short, long)]
        participant: i64,
        /// Raw answers, e.g. `5 3 4`
        answers: Vec<String>,
    },
    /// Split a survey's participants into balanced groups
    Generate {
        #[arg(short, long)]
        survey: i64,
        /// Members per group (defaults to group_size from config)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        size: Option<i64>,
        /// Also save the result as the survey's current groups
        #[arg(long)]
        store: bool,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },
    /// Show the most recently stored groups for a survey
    Stored {
        #[arg(short, long)]
        survey: i64,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },
    /// List every stored grouping for a survey, oldest first
    History {
        #[arg(short, long)]
        survey: i64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "group-former")]
#[command(about = "Form survey participant groups with balanced scores", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/group-former/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the data file (overrides data_path from config)
    #[arg(short, long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn fail(err: GroupingError) -> ! {
    eprintln!("{}", err);
    std::process::exit(err.exit_code());
}

fn print_partition(partition: &Partition, summary: Option<&PartitionSummary>, format: Format) {
    match format {
        Format::Table => println!(
            "{}",
            output::format_partition_table(partition, summary, output::should_use_colors())
        ),
        Format::Tsv => println!("{}", output::format_tsv(partition)),
        Format::Json => match output::format_json(partition) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        },
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_path = cli
        .data
        .map(PathBuf::from)
        .or_else(|| config.data_path.clone())
        .unwrap_or_else(default_data_path);
    log::debug!("Using data file {}", data_path.display());

    let store = JsonFileStore::open(data_path);
    let engine = GroupingEngine::new(&store, &store);

    match cli.command {
        Commands::Submit {
            survey,
            participant,
            answers,
        } => {
            if let Err(e) = config.effective_scale().validate_answers(&answers) {
                fail(e);
            }
            match store.record_submission(NewSubmission::new(survey, participant, answers)) {
                Ok(sub) => println!(
                    "Recorded submission {} for participant {} on survey {}",
                    sub.submission_id, sub.participant_id, sub.survey_id
                ),
                Err(e) => fail(e),
            }
        }
        Commands::Generate {
            survey,
            size,
            store: persist,
            format,
        } => {
            let Some(raw_size) = size.or(config.group_size) else {
                eprintln!("No group size given. Pass --size or set group_size in the config file.");
                std::process::exit(EXIT_INVALID_ARGUMENT);
            };
            let group_size = group_size_from(raw_size).unwrap_or_else(|e| fail(e));

            let (partition, summary) = engine
                .generate_with_summary(survey, group_size)
                .unwrap_or_else(|e| fail(e));

            if persist {
                match engine.persist(survey, &partition) {
                    Ok(row) => log::info!("Saved as grouping #{}", row.id),
                    Err(e) => fail(e),
                }
            }

            let summary = if cli.verbose { Some(&summary) } else { None };
            print_partition(&partition, summary, format);
        }
        Commands::Stored { survey, format } => {
            let partition = engine.get_stored_groups(survey).unwrap_or_else(|e| fail(e));
            print_partition(&partition, None, format);
        }
        Commands::History { survey, json } => {
            let rows = engine.partition_history(survey).unwrap_or_else(|e| fail(e));
            if json {
                match output::format_json(&rows) {
                    Ok(out) => println!("{}", out),
                    Err(e) => fail(e),
                }
            } else {
                println!("{}", output::format_history(&rows, output::should_use_colors()));
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
