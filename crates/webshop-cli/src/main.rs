mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use webshop_client::{EntityKind, ShopClient};

#[derive(Debug, Parser)]
#[command(name = "webshop-cli")]
#[command(about = "Query and update a webshop through its procedure-call API")]
struct Cli {
    /// Field projection to apply before the command, e.g.
    /// `order=id,status,orderlines`. May be repeated.
    #[arg(long = "project", value_parser = parse_projection)]
    projections: Vec<Projection>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List all users
    Users,
    /// Fetch orders placed since a date, one month per request
    Orders {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: chrono::NaiveDate,
        /// Last day to include (YYYY-MM-DD); without it the range runs until now
        #[arg(long)]
        until: Option<chrono::NaiveDate>,
        /// Comma-separated status codes, e.g. 1,2,3
        #[arg(long, value_parser = parse_statuses, default_value = "")]
        status: Statuses,
    },
    /// Show orders from the configured recent window
    Recent,
    /// Show a single order and its order lines
    Order {
        id: i64,
    },
    /// List products, optionally filtered by a search string
    Products {
        #[arg(long)]
        search: Option<String>,
    },
    /// List categories
    Categories,
    /// List delivery methods
    Deliveries,
    /// Set the status of an order
    SetStatus {
        id: i64,
        status: u32,
    },
    /// Replace the comment on an order
    Comment {
        id: i64,
        comment: String,
    },
}

#[derive(Debug, Clone)]
struct Statuses(Vec<u32>);

#[derive(Debug, Clone)]
struct Projection {
    entity: EntityKind,
    fields: Vec<String>,
}

fn parse_projection(raw: &str) -> Result<Projection, String> {
    let (entity, fields) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ENTITY=field,field but got \"{raw}\""))?;
    let fields: Vec<String> = fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_owned)
        .collect();
    if fields.is_empty() {
        return Err(format!("no fields given for {entity}"));
    }
    Ok(Projection {
        entity: entity.trim().parse()?,
        fields,
    })
}

fn parse_statuses(raw: &str) -> Result<Statuses, String> {
    webshop_core::parse_status_list(raw).map(Statuses)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = webshop_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut client = ShopClient::connect(&config).await?;
    tracing::debug!(env = %config.env, "connected");

    for projection in &cli.projections {
        commands::project(&mut client, projection.entity, &projection.fields).await?;
    }

    match cli.command {
        Commands::Users => commands::users(&mut client).await,
        Commands::Orders {
            from,
            until,
            status,
        } => commands::orders(&client, from, until, &status.0).await,
        Commands::Recent => commands::recent(&mut client).await,
        Commands::Order { id } => commands::order(&client, id).await,
        Commands::Products { search } => commands::products(&client, search.as_deref()).await,
        Commands::Categories => commands::categories(&client).await,
        Commands::Deliveries => commands::deliveries(&client).await,
        Commands::SetStatus { id, status } => commands::set_status(&client, id, status).await,
        Commands::Comment { id, comment } => commands::comment(&client, id, &comment).await,
    }
}
