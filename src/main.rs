use std::{env, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use monedero::{
    CategoryCatalog, FixedIdentityProvider, HttpRemoteStore, NewTransaction, SqliteSnapshotCache,
    SyncStatus, TransactionPatch, TransactionStore, TransactionType,
};

/// Track income and expenses against a remote service with an offline cache.
#[derive(Parser)]
#[command(name = "monedero", version, about)]
struct Cli {
    /// Base URL of the transaction API. Defaults to $MONEDERO_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Path to the offline cache database. Defaults to $MONEDERO_CACHE,
    /// then "monedero.db".
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Remote user ID that scopes the collection; omit for anonymous mode.
    #[arg(long)]
    user_id: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List transactions, optionally filtered by type.
    List {
        /// Only show "income" or "expense" transactions.
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },
    /// Record a new transaction.
    Add {
        /// "income" or "expense".
        #[arg(long = "type")]
        kind: TransactionType,
        /// The amount of money moved; must not be negative.
        #[arg(long)]
        amount: f64,
        /// The category to group the transaction under.
        #[arg(long)]
        category: String,
        /// What the transaction was for.
        #[arg(long, default_value = "")]
        description: String,
        /// When the transaction happened, as RFC 3339; defaults to now.
        #[arg(long)]
        date: Option<String>,
        /// ISO currency code.
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Change fields of an existing transaction.
    Edit {
        /// The ID of the transaction to change.
        id: String,
        /// A new type: "income" or "expense".
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        /// A new amount; must not be negative.
        #[arg(long)]
        amount: Option<f64>,
        /// A new category.
        #[arg(long)]
        category: Option<String>,
        /// A new description.
        #[arg(long)]
        description: Option<String>,
        /// A new date, as RFC 3339.
        #[arg(long)]
        date: Option<String>,
        /// A new ISO currency code.
        #[arg(long)]
        currency: Option<String>,
    },
    /// Delete a transaction.
    Remove {
        /// The ID of the transaction to delete.
        id: String,
    },
    /// Show the balance and the totals per type and category.
    Summary,
    /// List the spending categories known to the remote service.
    Categories,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().with_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("monedero=warn")),
            ),
        )
        .init();

    let cli = Cli::parse();

    let api_url = cli
        .api_url
        .or_else(|| env::var("MONEDERO_API_URL").ok())
        .unwrap_or_else(|| "http://localhost:3000".to_owned());
    let cache_path = cli
        .cache
        .or_else(|| env::var("MONEDERO_CACHE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("monedero.db"));

    let remote = match HttpRemoteStore::new(&api_url) {
        Ok(remote) => remote,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    if let Command::Categories = cli.command {
        return list_categories(&remote).await;
    }

    let cache = match SqliteSnapshotCache::open(&cache_path) {
        Ok(cache) => cache,
        Err(error) => {
            eprintln!("could not open the cache database {}: {error}", cache_path.display());
            return ExitCode::FAILURE;
        }
    };
    let identity = match cli.user_id {
        Some(user_id) => FixedIdentityProvider::logged_in(user_id),
        None => FixedIdentityProvider::anonymous(),
    };

    let store = TransactionStore::new(remote, cache, identity);
    if store.load().await == SyncStatus::LocalOnly {
        eprintln!("(offline: showing the locally cached transactions)");
    }

    match cli.command {
        Command::List { kind } => list(&store, kind),
        Command::Add {
            kind,
            amount,
            category,
            description,
            date,
            currency,
        } => {
            let date = match parse_date(date) {
                Ok(date) => date,
                Err(message) => {
                    eprintln!("{message}");
                    return ExitCode::FAILURE;
                }
            };

            let new = match NewTransaction::new(kind, amount, category, description, date, currency)
            {
                Ok(new) => new,
                Err(error) => {
                    eprintln!("{error}");
                    return ExitCode::FAILURE;
                }
            };

            let (transaction, status) = store.add(new).await;
            println!(
                "recorded {} {} {} under {} ({})",
                transaction.kind,
                transaction.amount,
                transaction.currency,
                transaction.category,
                transaction.id
            );
            report(status);
        }
        Command::Edit {
            id,
            kind,
            amount,
            category,
            description,
            date,
            currency,
        } => {
            let mut patch = TransactionPatch::new();
            if let Some(kind) = kind {
                patch = patch.kind(kind);
            }
            if let Some(amount) = amount {
                patch = match patch.amount(amount) {
                    Ok(patch) => patch,
                    Err(error) => {
                        eprintln!("{error}");
                        return ExitCode::FAILURE;
                    }
                };
            }
            if let Some(category) = category {
                patch = patch.category(category);
            }
            if let Some(description) = description {
                patch = patch.description(description);
            }
            if let Some(date) = date {
                match parse_date(Some(date)) {
                    Ok(date) => patch = patch.date(date),
                    Err(message) => {
                        eprintln!("{message}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            if let Some(currency) = currency {
                patch = patch.currency(currency);
            }

            let status = store.update(&id, patch).await;
            report(status);
        }
        Command::Remove { id } => {
            let status = store.remove(&id).await;
            report(status);
        }
        Command::Summary => summary(&store),
        Command::Categories => unreachable!("handled before the store is built"),
    }

    ExitCode::SUCCESS
}

fn report(status: SyncStatus) {
    if status == SyncStatus::LocalOnly {
        eprintln!("(offline: the change was saved locally and not confirmed by the remote service)");
    }
}

fn parse_date(date: Option<String>) -> Result<OffsetDateTime, String> {
    match date {
        Some(text) => OffsetDateTime::parse(&text, &Rfc3339).map_err(|_| {
            format!("\"{text}\" is not an RFC 3339 date-time, e.g. 2024-06-01T12:00:00Z")
        }),
        None => Ok(OffsetDateTime::now_utc()),
    }
}

fn list<R, C, I>(store: &TransactionStore<R, C, I>, kind: Option<TransactionType>)
where
    R: monedero::RemoteStore,
    C: monedero::SnapshotCache,
    I: monedero::IdentityProvider,
{
    for transaction in store.transactions().iter() {
        if kind.is_some_and(|kind| transaction.kind != kind) {
            continue;
        }

        println!(
            "{}  {:>8}  {:10.2} {}  {:16}  {}  [{}]",
            transaction.date.date(),
            transaction.kind.to_string(),
            transaction.amount,
            transaction.currency,
            transaction.category,
            transaction.description,
            transaction.id
        );
    }
}

fn summary<R, C, I>(store: &TransactionStore<R, C, I>)
where
    R: monedero::RemoteStore,
    C: monedero::SnapshotCache,
    I: monedero::IdentityProvider,
{
    println!("income:   {:10.2}", store.total_by_type(TransactionType::Income));
    println!("expenses: {:10.2}", store.total_by_type(TransactionType::Expense));
    println!("balance:  {:10.2}", store.balance());

    let mut totals: Vec<_> = store.totals_by_category().into_iter().collect();
    totals.sort_by(|(a, _), (b, _)| a.cmp(b));

    if !totals.is_empty() {
        println!();
        println!("per category:");
        for (category, total) in totals {
            println!("  {category:16} {total:10.2}");
        }
    }
}

async fn list_categories(remote: &HttpRemoteStore) -> ExitCode {
    match remote.categories().await {
        Ok(categories) => {
            for category in categories {
                println!(
                    "{:16} limit {:8.2}  {}",
                    category.name, category.budget_limit, category.color
                );
            }

            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("could not list the remote categories: {error}");
            ExitCode::FAILURE
        }
    }
}
