//! Command-line entry-point for the Terrabia marketplace client.
//!
//! Wires the reqwest transport, the file-backed session and the watch-channel
//! login boundary into a [`MarketplaceService`], then runs one subcommand.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, BufRead};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use terrabia_client::config::ClientSettings;
use terrabia_client::domain::models::{ProductQuery, UserRole};
use terrabia_client::domain::{
    ApiClient, LoginCredentials, MarketplaceService, Registration, RegistrationOutcome,
    SessionStore,
};
use terrabia_client::outbound::http::ReqwestTransport;
use terrabia_client::outbound::navigation::WatchLoginBoundary;
use terrabia_client::outbound::storage::FileSessionStorage;

/// `terrabia` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "terrabia",
    about = "Talk to the Terrabia marketplace API with a persisted session",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login {
        /// Email address or username.
        #[arg(long)]
        identifier: String,
        /// Password; read from the first line of stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in when the server allows it.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Buyer)]
        role: RoleArg,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Password; read from the first line of stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// End the session on the server and locally.
    Logout,
    /// Show the signed-in profile.
    Whoami,
    /// List products.
    Products {
        /// Free-text search term.
        #[arg(long)]
        search: Option<String>,
        /// Restrict to one category id.
        #[arg(long)]
        category: Option<u64>,
    },
    /// List orders visible to the signed-in user.
    Orders {
        /// Which order view to list.
        #[arg(long, value_enum, default_value_t = OrderView::Mine)]
        view: OrderView,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Buyer,
    Farmer,
    Delivery,
}

impl From<RoleArg> for UserRole {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Buyer => Self::Buyer,
            RoleArg::Farmer => Self::Farmer,
            RoleArg::Delivery => Self::Delivery,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderView {
    /// Orders placed by the signed-in buyer.
    Mine,
    /// Orders containing the signed-in farmer's products.
    Farmer,
    /// Orders assigned to or claimable by the signed-in delivery agent.
    Delivery,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("terrabia")])
        .map_err(|error| eyre!("failed to load client settings: {error}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args.command, &settings))
}

fn build_service(settings: &ClientSettings) -> Result<MarketplaceService> {
    let base_url = settings.base_url()?;
    let transport = ReqwestTransport::new(
        base_url,
        settings.request_timeout()?,
        &settings.user_agent(),
    )
    .wrap_err("failed to build HTTP client")?;

    let session_dir = settings.session_dir();
    let storage = FileSessionStorage::open(&session_dir)
        .with_context(|| format!("failed to open session directory {}", session_dir.display()))?;
    info!(path = %storage.path().display(), "session file");

    let login_boundary = WatchLoginBoundary::new(settings.login_path(), "/");
    let client = ApiClient::new(
        Arc::new(transport),
        SessionStore::new(Arc::new(storage)),
        Arc::new(login_boundary),
    );
    Ok(MarketplaceService::new(client))
}

async fn run(command: Command, settings: &ClientSettings) -> Result<()> {
    let service = build_service(settings)?;
    match command {
        Command::Login {
            identifier,
            password,
        } => {
            let password = resolve_password(password)?;
            let credentials = LoginCredentials::try_from_parts(&identifier, &password)?;
            let session = service.login(&credentials).await?;
            println!("signed in as {}", session.user.display_name());
        }
        Command::Register {
            email,
            username,
            role,
            first_name,
            last_name,
            phone,
            password,
        } => {
            let registration = Registration {
                email,
                username,
                password: resolve_password(password)?,
                first_name: first_name.unwrap_or_default(),
                last_name: last_name.unwrap_or_default(),
                role: role.into(),
                phone,
            };
            match service.register(&registration).await? {
                RegistrationOutcome::Authenticated(session) => {
                    println!("registered and signed in as {}", session.user.display_name());
                }
                RegistrationOutcome::RequiresManualLogin { user } => {
                    let name = user.map_or(registration.email, |user| user.display_name());
                    println!("registered {name}; sign in with `terrabia login`");
                }
            }
        }
        Command::Logout => {
            service.logout().await?;
            println!("signed out");
        }
        Command::Whoami => {
            let user = service.current_user().await?;
            println!("id={}", user.id);
            println!("name={}", user.display_name());
            println!("email={}", user.email);
            println!("role={}", user.role.as_str());
        }
        Command::Products { search, category } => {
            let query = ProductQuery {
                search,
                category,
                ..ProductQuery::default()
            };
            for product in service.products(&query).await? {
                println!(
                    "{}\t{}\t{:.2}\tstock={}",
                    product.id, product.name, product.price, product.stock
                );
            }
        }
        Command::Orders { view } => {
            let orders = match view {
                OrderView::Mine => service.orders().await?,
                OrderView::Farmer => service.farmer_orders().await?,
                OrderView::Delivery => service.delivery_orders().await?,
            };
            for order in orders {
                let total = order
                    .total_amount
                    .map_or_else(|| "-".to_owned(), |total| format!("{total:.2}"));
                println!(
                    "{}\t{}\titems={}\ttotal={total}",
                    order.id,
                    order.status.as_str(),
                    order.items.len()
                );
            }
        }
    }
    Ok(())
}

fn resolve_password(flag: Option<String>) -> Result<Zeroizing<String>> {
    if let Some(password) = flag {
        return Ok(Zeroizing::new(password));
    }
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .wrap_err("failed to read password from stdin")?;
    Ok(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_owned()))
}
