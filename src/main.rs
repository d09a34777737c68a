use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use stockbook::core::analytics::Step;
use stockbook::core::log::init_logging;
use stockbook::core::records::ExpenseCategory;
use stockbook::workflow::{ExpenseLine, SaleLine};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show stock levels and today's takings at a glance
    Dashboard,
    /// Manage stock items
    #[command(subcommand)]
    Stock(StockCommands),
    /// Close out a day and browse daily sales
    #[command(subcommand)]
    Sales(SalesCommands),
    /// Record and list expenses
    #[command(subcommand)]
    Expenses(ExpenseCommands),
    /// Show everything recorded on one day
    Report {
        /// Day to show (YYYY-MM-DD), defaults to the latest recorded day
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Move to the previous recorded day
        #[arg(long, conflicts_with = "next")]
        previous: bool,
        /// Move to the next recorded day
        #[arg(long)]
        next: bool,
    },
    /// Display monthly performance, profit distribution and best sellers
    Analysis,
}

#[derive(Subcommand)]
enum StockCommands {
    /// List stock with status and margins
    List,
    /// Add a new stock item
    Add {
        name: String,
        #[arg(short, long, default_value_t = 0.0)]
        quantity: f64,
        #[arg(short, long)]
        buying_price: f64,
        #[arg(short, long)]
        selling_price: f64,
    },
    /// Add quantity to an item (by name or id)
    Restock { item: String, quantity: f64 },
    /// Delete an item (by name or id)
    Delete { item: String },
}

#[derive(Args)]
struct CloseArgs {
    /// Day being closed (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,
    /// Item sold as ITEM=QUANTITY, e.g. "Soda=3" or "Sugar=1/2". Repeatable.
    #[arg(short, long = "sale", required = true)]
    sales: Vec<SaleLine>,
    /// M-Pesa takings for the day
    #[arg(short, long, default_value_t = 0.0)]
    mpesa: f64,
    /// Cash expense as DESCRIPTION=AMOUNT. Repeatable.
    #[arg(short, long = "expense")]
    expenses: Vec<ExpenseLine>,
    /// Show the totals without recording anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum SalesCommands {
    /// Record a day's sales, expenses and summary
    Close(CloseArgs),
    /// Show a closed day, or the stock sheet for an open one
    Day {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// List daily summaries, newest first
    Ledger {
        /// Number of times to grow the window (10, 30, 80, then all days)
        #[arg(short, long, default_value_t = 0)]
        expand: usize,
        /// Show every day
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ExpenseCommands {
    /// Record an expense paid in cash
    Add {
        description: String,
        amount: f64,
        /// One of transport, supplies, utilities, maintenance, marketing,
        /// staff, rent, daily, other
        #[arg(short = 'k', long, default_value = "other")]
        category: ExpenseCategory,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// List expenses, optionally for one day
    List {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

impl From<Commands> for stockbook::AppCommand {
    fn from(cmd: Commands) -> stockbook::AppCommand {
        use stockbook::AppCommand;
        match cmd {
            Commands::Dashboard => AppCommand::Dashboard,
            Commands::Stock(StockCommands::List) => AppCommand::StockList,
            Commands::Stock(StockCommands::Add {
                name,
                quantity,
                buying_price,
                selling_price,
            }) => AppCommand::StockAdd {
                name,
                quantity,
                buying_price,
                selling_price,
            },
            Commands::Stock(StockCommands::Restock { item, quantity }) => {
                AppCommand::StockRestock { item, quantity }
            }
            Commands::Stock(StockCommands::Delete { item }) => AppCommand::StockDelete { item },
            Commands::Sales(SalesCommands::Close(args)) => AppCommand::SalesClose {
                date: args.date,
                sales: args.sales,
                mpesa: args.mpesa,
                expenses: args.expenses,
                dry_run: args.dry_run,
            },
            Commands::Sales(SalesCommands::Day { date }) => AppCommand::SalesDay { date },
            Commands::Sales(SalesCommands::Ledger { expand, all }) => {
                AppCommand::SalesLedger { expand, all }
            }
            Commands::Expenses(ExpenseCommands::Add {
                description,
                amount,
                category,
                date,
            }) => AppCommand::ExpensesAdd {
                date,
                description,
                amount,
                category,
            },
            Commands::Expenses(ExpenseCommands::List { date }) => {
                AppCommand::ExpensesList { date }
            }
            Commands::Report {
                date,
                previous,
                next,
            } => AppCommand::Report {
                date,
                step: match (previous, next) {
                    (true, _) => Some(Step::Older),
                    (_, true) => Some(Step::Newer),
                    _ => None,
                },
            },
            Commands::Analysis => AppCommand::Analysis,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => stockbook::cli::setup::setup(),
        Some(cmd) => stockbook::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
