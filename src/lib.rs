pub mod cli;
pub mod core;
pub mod repository;
pub mod state;
pub mod store;
pub mod workflow;

use crate::core::config::AppConfig;
use crate::core::records::ExpenseCategory;
use crate::repository::Repository;
use crate::state::AppState;
use crate::workflow::{ExpenseLine, SaleLine, Shop};
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Dashboard,
    StockList,
    StockAdd {
        name: String,
        quantity: f64,
        buying_price: f64,
        selling_price: f64,
    },
    StockRestock {
        item: String,
        quantity: f64,
    },
    StockDelete {
        item: String,
    },
    SalesClose {
        date: Option<NaiveDate>,
        sales: Vec<SaleLine>,
        mpesa: f64,
        expenses: Vec<ExpenseLine>,
        dry_run: bool,
    },
    SalesDay {
        date: Option<NaiveDate>,
    },
    SalesLedger {
        expand: usize,
        all: bool,
    },
    ExpensesAdd {
        date: Option<NaiveDate>,
        description: String,
        amount: f64,
        category: ExpenseCategory,
    },
    ExpensesList {
        date: Option<NaiveDate>,
    },
    Report {
        date: Option<NaiveDate>,
        step: Option<crate::core::analytics::Step>,
    },
    Analysis,
}

/// Everything a command needs: the configuration, the shop workflows and
/// the loaded state.
pub struct App {
    pub config: AppConfig,
    pub shop: Shop,
    pub state: AppState,
}

impl App {
    /// Opens the configured store and loads the shop data.
    pub async fn open(config: AppConfig) -> Result<Self> {
        let store = store::open_store(&config)?;
        let shop = Shop::new(Repository::new(store), config.allow_negative_stock);
        let mut state = AppState::new();

        let pb = cli::ui::new_spinner("Loading shop data...");
        let loaded = state.fetch_all(shop.repository()).await;
        pb.finish_and_clear();
        loaded?;

        Ok(App {
            config,
            shop,
            state,
        })
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }
}

/// Today's date on the local clock, used when a command is given no date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Stockbook starting...");
    let config = load_config(config_path)?;
    let mut app = App::open(config).await?;
    let output = execute(&mut app, command).await?;
    println!("{output}");
    Ok(())
}

/// Runs one command against an open app and returns what it prints.
pub async fn execute(app: &mut App, command: AppCommand) -> Result<String> {
    match command {
        AppCommand::Dashboard => Ok(cli::dashboard::run(app)),
        AppCommand::StockList => Ok(cli::stock::run_list(app)),
        AppCommand::StockAdd {
            name,
            quantity,
            buying_price,
            selling_price,
        } => {
            cli::stock::run_add(
                app,
                workflow::NewStockItem {
                    name,
                    quantity,
                    buying_price,
                    selling_price,
                },
            )
            .await
        }
        AppCommand::StockRestock { item, quantity } => {
            cli::stock::run_restock(app, &item, quantity).await
        }
        AppCommand::StockDelete { item } => cli::stock::run_delete(app, &item).await,
        AppCommand::SalesClose {
            date,
            sales,
            mpesa,
            expenses,
            dry_run,
        } => {
            let input = workflow::DayClose {
                date: date.unwrap_or_else(today),
                sales,
                mpesa,
                expenses,
            };
            cli::sales::run_close(app, &input, dry_run).await
        }
        AppCommand::SalesDay { date } => Ok(cli::sales::run_day(app, date.unwrap_or_else(today))),
        AppCommand::SalesLedger { expand, all } => Ok(cli::sales::run_ledger(app, expand, all)),
        AppCommand::ExpensesAdd {
            date,
            description,
            amount,
            category,
        } => {
            cli::expenses::run_add(
                app,
                workflow::NewExpense {
                    date: date.unwrap_or_else(today),
                    description,
                    amount,
                    category,
                },
            )
            .await
        }
        AppCommand::ExpensesList { date } => Ok(cli::expenses::run_list(app, date)),
        AppCommand::Report { date, step } => cli::report::run(app, date, step),
        AppCommand::Analysis => Ok(cli::analysis::run(app)),
    }
}
