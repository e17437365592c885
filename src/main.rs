// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Realty CLI
//!
//! Command-line front end for the marketplace: every invocation restores the
//! persisted session first, the way a page reload would.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use realty_client::{
    config::Config,
    models::{NewComment, OfferType, PropertyConfig, PropertySearch, Registration, Role},
    session::{FileSessionStore, LoginRedirect},
    ClientError, FavoritesSynchronizer, SessionManager,
};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "realty", about = "Real-estate marketplace client", version)]
struct Cli {
    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account, then log in
    Register {
        #[arg(long, value_enum)]
        role: RoleArg,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
    },
    /// Forget the persisted session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Browse listings
    #[command(subcommand)]
    Properties(PropertiesCommand),
    /// Browse the broker directory
    #[command(subcommand)]
    Brokers(BrokersCommand),
    /// Manage favorites (customers)
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Place an offer on a property (customers)
    Offer {
        property_id: i64,
        #[arg(long)]
        price: f64,
    },
    /// Show deal history (customers)
    Deals,
    /// Property reviews
    #[command(subcommand)]
    Comments(CommentsCommand),
    /// Show your listings (brokers)
    Listings,
}

#[derive(Subcommand)]
enum PropertiesCommand {
    List,
    Show {
        property_id: i64,
    },
    Search {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        config: Option<PropertyConfig>,
        #[arg(long)]
        offer: Option<OfferType>,
        #[arg(long)]
        min_cost: Option<f64>,
        #[arg(long)]
        max_cost: Option<f64>,
        #[arg(long)]
        min_area: Option<f64>,
        #[arg(long)]
        max_area: Option<f64>,
        #[arg(long)]
        min_rating: Option<f64>,
        #[arg(long)]
        available_only: bool,
    },
}

#[derive(Subcommand)]
enum BrokersCommand {
    List,
    Top,
    Ratings {
        broker_id: i64,
    },
    Rate {
        broker_id: i64,
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    Add { property_id: i64 },
    Remove { property_id: i64 },
    Toggle { property_id: i64 },
}

#[derive(Subcommand)]
enum CommentsCommand {
    List {
        property_id: i64,
    },
    Add {
        property_id: i64,
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        content: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Broker,
    Customer,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Broker => Role::Broker,
            RoleArg::Customer => Role::Customer,
        }
    }
}

/// Tells the user to log in again when the backend rejects the session.
struct CliRedirect;

impl LoginRedirect for CliRedirect {
    fn redirect_to_login(&self, login_path: &str) {
        tracing::warn!(login_path, "Session rejected by backend");
        eprintln!("Session expired or rejected; run `realty login` to sign in again.");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api_base = config.base_str(), "Using backend");

    let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let session = SessionManager::from_config(&config, store, Arc::new(CliRedirect))?;
    session.restore_session();

    match run(cli.command, &session).await {
        Err(e) if e.downcast_ref::<ClientError>().is_some_and(ClientError::is_auth_failure) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
        other => other,
    }
}

async fn run(command: Command, session: &SessionManager) -> anyhow::Result<()> {
    let api = session.api();

    match command {
        Command::Login { email, password } => print(&session.login(&email, &password).await?),
        Command::Register {
            role,
            name,
            email,
            password,
            city,
            mobile,
        } => {
            let registration = Registration {
                role: role.into(),
                name,
                email,
                password,
                city,
                mobile,
            };
            print(&session.register(registration).await?)
        }
        Command::Logout => {
            session.logout();
            Ok(())
        }
        Command::Whoami => match session.current_identity() {
            Some(identity) => print(&identity),
            None => {
                println!("Not logged in");
                Ok(())
            }
        },
        Command::Properties(cmd) => match cmd {
            PropertiesCommand::List => print(&api.list_properties().await?),
            PropertiesCommand::Show { property_id } => {
                print(&api.get_property(property_id).await?)
            }
            PropertiesCommand::Search {
                city,
                config,
                offer,
                min_cost,
                max_cost,
                min_area,
                max_area,
                min_rating,
                available_only,
            } => {
                let search = PropertySearch {
                    city,
                    config,
                    offer,
                    min_cost,
                    max_cost,
                    min_area,
                    max_area,
                    min_rating,
                    available_only: available_only.then_some(true),
                };
                print(&api.search_properties(&search).await?)
            }
        },
        Command::Brokers(cmd) => match cmd {
            BrokersCommand::List => print(&api.list_brokers().await?),
            BrokersCommand::Top => print(&api.top_rated_brokers().await?),
            BrokersCommand::Ratings { broker_id } => print(&api.broker_ratings(broker_id).await?),
            BrokersCommand::Rate {
                broker_id,
                rating,
                comment,
            } => print(&api.rate_broker(broker_id, rating, &comment).await?),
        },
        Command::Favorites(cmd) => {
            let favorites = FavoritesSynchronizer::new(session);
            favorites.load().await?;
            match cmd {
                FavoritesCommand::List => print(&favorites.favorites()),
                FavoritesCommand::Add { property_id } => {
                    print(&favorites.toggle(property_id, Some(true)).await?)
                }
                FavoritesCommand::Remove { property_id } => {
                    print(&favorites.toggle(property_id, Some(false)).await?)
                }
                FavoritesCommand::Toggle { property_id } => {
                    print(&favorites.toggle(property_id, None).await?)
                }
            }
        }
        Command::Offer { property_id, price } => {
            print(&session.place_offer(property_id, price).await?)
        }
        Command::Deals => print(&session.deal_history().await?),
        Command::Comments(cmd) => match cmd {
            CommentsCommand::List { property_id } => {
                print(&api.property_comments(property_id).await?)
            }
            CommentsCommand::Add {
                property_id,
                rating,
                content,
            } => print(
                &api.add_comment(property_id, &NewComment::new(&content, rating))
                    .await?,
            ),
        },
        Command::Listings => print(&session.my_listings().await?),
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize logging on stderr, structured JSON when requested.
fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("realty_client=info"));

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let plain_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .init();
}
