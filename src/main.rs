use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dayplan",
    about = "Personal task planner with calendar sync and daily summaries"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the planner hub (HTTP API + daily summary scheduler)
    Serve,

    /// List tasks (today by default)
    List {
        /// Show a specific day (YYYY-MM-DD)
        #[arg(long, conflicts_with_all = ["week", "all"])]
        date: Option<NaiveDate>,
        /// Show the current week (Monday to Sunday)
        #[arg(long, conflicts_with = "all")]
        week: bool,
        /// Show every stored task
        #[arg(long)]
        all: bool,
    },

    /// Create a task
    Add {
        title: String,
        /// Task day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Time of day (HH:MM); defaults to 09:00
        #[arg(long)]
        time: Option<String>,
        /// Explicit end of the calendar event (HH:MM)
        #[arg(long)]
        end_time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// work | personal | study | other
        #[arg(long)]
        category: Option<String>,
        /// low | medium | high
        #[arg(long)]
        priority: Option<String>,
    },

    /// Update fields on an existing task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        end_time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },

    /// Delete a task
    Remove { id: String },

    /// Trigger the daily summary email on the hub
    Summary {
        /// Summary day (YYYY-MM-DD); defaults to today on the hub
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Override the configured recipients (repeatable)
        #[arg(long = "recipient")]
        recipients: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve => dayplan_hub::run_hub().await,
        Commands::List { date, week, all } => {
            dayplan_cli::commands::list::run(date, week, all).await
        }
        Commands::Add {
            title,
            date,
            time,
            end_time,
            description,
            category,
            priority,
        } => {
            dayplan_cli::commands::add::run(
                title,
                date,
                time,
                end_time,
                description,
                category,
                priority,
            )
            .await
        }
        Commands::Edit {
            id,
            title,
            date,
            time,
            end_time,
            description,
            category,
            priority,
        } => {
            dayplan_cli::commands::edit::run(
                id,
                title,
                date,
                time,
                end_time,
                description,
                category,
                priority,
            )
            .await
        }
        Commands::Remove { id } => dayplan_cli::commands::remove::run(id).await,
        Commands::Summary { date, recipients } => {
            dayplan_cli::commands::summary::run(date, recipients).await
        }
    }
}
