mod config;
mod fixtures;
mod logging;
mod posts;

use std::collections::BTreeMap;
use std::path::PathBuf;

use acquire_mock::{MockError, SortDirection};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use config::{ConfigError, load_config};
use fixtures::{Comment, Fixtures, Post, User, populate};
use posts::{PostQuery, create_post, list_posts};

#[derive(Debug, Error)]
enum CliError {
    #[error("mock error: {0}")]
    Mock(#[from] MockError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "acquire", version, about = "Acquire mock data CLI")]
struct Cli {
    #[command(flatten)]
    fixtures: FixtureArgs,
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct FixtureArgs {
    /// TOML fixture file; defaults apply when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed overriding the fixture file.
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the mock cache and print partition sizes.
    Populate,
    /// Query posts the way a paginated list endpoint would.
    Posts(PostsArgs),
    /// Create a post owned by the demo user.
    CreatePost(CreatePostArgs),
}

#[derive(Args, Debug)]
struct PostsArgs {
    #[arg(long)]
    user_id: Option<u64>,
    /// One-based page number.
    #[arg(long)]
    page: Option<i64>,
    #[arg(long)]
    limit: Option<usize>,
    /// Field to sort by.
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, default_value_t = SortDirection::Asc)]
    order: SortDirection,
    /// Keyword matched against title and body.
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args, Debug)]
struct CreatePostArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    body: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_json).map_err(CliError::Logging)?;

    let config = load_config(cli.fixtures.config.as_deref())?.with_seed(cli.fixtures.seed);
    let fixtures = populate(&config).await?;

    match cli.command {
        Command::Populate => print_json(&partition_sizes(&fixtures)),
        Command::Posts(args) => run_posts(&fixtures, args),
        Command::CreatePost(args) => {
            let post = create_post(&fixtures, &args.title, &args.body).await?;
            print_json(&post)
        }
    }
}

fn run_posts(fixtures: &Fixtures, args: PostsArgs) -> Result<(), CliError> {
    let PostsArgs {
        user_id,
        page,
        limit,
        sort,
        order,
        search,
    } = args;

    let query = PostQuery {
        user_id,
        page,
        limit,
        sort,
        order,
        search,
    };
    print_json(&list_posts(fixtures, &query))
}

fn partition_sizes(fixtures: &Fixtures) -> BTreeMap<&'static str, usize> {
    BTreeMap::from([
        ("users", fixtures.cache.size::<User>()),
        ("posts", fixtures.cache.size::<Post>()),
        ("comments", fixtures.cache.size::<Comment>()),
    ])
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
