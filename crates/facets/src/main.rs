//! Facet query CLI.
//!
//! Runs facet requests against the catalogue database and prints the
//! responses as JSON.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use geonode_facets::facets::{
    FacetKey, FacetPageRequest, FacetRegistry, FacetService, GroupFacetProvider, ResourceFilter,
    ResourceQuery,
};
use geonode_facets::models::UserContext;
use geonode_facets::security::PgGroupVisibility;
use geonode_facets::store::PgFacetStore;
use geonode_facets::{Config, db};

#[derive(Parser)]
#[command(name = "geonode-facets", about = "Query search facets for catalogue resources")]
struct Cli {
    /// Evaluate as this user profile id (anonymous when omitted).
    #[arg(long, global = true)]
    user: Option<i64>,

    /// Language for facet labels.
    #[arg(long, global = true, default_value = "en")]
    lang: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered facets.
    List {
        /// Include the first page of topics for each facet.
        #[arg(long)]
        include_topics: bool,

        #[command(flatten)]
        resources: ResourceArgs,
    },
    /// Show one page of a facet's counted values.
    Items {
        /// Facet name.
        facet: String,

        /// Zero-based page number.
        #[arg(long, default_value_t = 0)]
        page: u64,

        #[arg(long)]
        page_size: Option<u64>,

        /// Only values whose label contains this text.
        #[arg(long)]
        topic_contains: Option<String>,

        /// Only these values (repeatable).
        #[arg(long = "key")]
        keys: Vec<String>,

        #[command(flatten)]
        resources: ResourceArgs,
    },
    /// Resolve facet keys to labels.
    Topics {
        /// Facet name.
        facet: String,

        #[arg(long = "key", required = true)]
        keys: Vec<String>,
    },
}

/// Base resource query options.
#[derive(clap::Args)]
struct ResourceArgs {
    /// Restrict to resource types (repeatable).
    #[arg(long = "resource-type")]
    resource_types: Vec<String>,

    /// Restrict by published flag.
    #[arg(long)]
    published: Option<bool>,

    /// Restrict to titles containing this text.
    #[arg(long)]
    title_contains: Option<String>,
}

impl ResourceArgs {
    fn to_query(&self) -> ResourceQuery {
        let mut query = ResourceQuery::all();
        if !self.resource_types.is_empty() {
            query = query.resource_types(self.resource_types.iter().cloned());
        }
        if let Some(published) = self.published {
            query = query.published(published);
        }
        if let Some(ref text) = self.title_contains {
            query = query.filter(ResourceFilter::TitleContains(text.clone()));
        }
        query
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let pool = db::create_pool(&config).await?;
    db::check_catalogue(&pool)
        .await
        .context("database is not ready for facet queries")?;

    let user = match cli.user {
        Some(id) => UserContext::load(&pool, id)
            .await?
            .with_context(|| format!("user {id} not found or inactive"))?,
        None => UserContext::anonymous(),
    };

    let store = Arc::new(
        PgFacetStore::new(pool.clone())
            .with_statement_timeout(Duration::from_secs(config.facet_statement_timeout_secs)),
    );
    let visibility = Arc::new(PgGroupVisibility::new(pool));

    let mut registry = FacetRegistry::new();
    GroupFacetProvider::register(
        &mut registry,
        store,
        visibility,
        config.facet_trace_queries,
    );
    info!(facets = registry.len(), "facet providers registered");

    let service =
        FacetService::new(Arc::new(registry)).with_default_page_size(config.facet_page_size);

    match cli.command {
        Command::List {
            include_topics,
            resources,
        } => {
            let facets = service
                .list_facets(&resources.to_query(), &cli.lang, Some(&user), include_topics)
                .await?;
            print_json(&facets)?;
        }
        Command::Items {
            facet,
            page,
            page_size,
            topic_contains,
            keys,
            resources,
        } => {
            let request = FacetPageRequest {
                page,
                page_size: page_size.unwrap_or(config.facet_page_size),
                lang: cli.lang.clone(),
                topic_contains,
                keys: keys.iter().map(|k| parse_key(k)).collect(),
            };
            let response = service
                .get_facet(&facet, &resources.to_query(), &request, Some(&user))
                .await?;
            print_json(&response)?;
        }
        Command::Topics { facet, keys } => {
            let keys: Vec<FacetKey> = keys.iter().map(|k| parse_key(k)).collect();
            let topics = service
                .get_topics(&facet, &keys, &cli.lang, Some(&user))
                .await?;
            print_json(&topics)?;
        }
    }

    Ok(())
}

/// Integer keys stay integers; anything else is passed through as text.
fn parse_key(raw: &str) -> FacetKey {
    match raw.parse::<i64>() {
        Ok(v) => FacetKey::Int(v),
        Err(_) => FacetKey::Text(raw.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize response")?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
