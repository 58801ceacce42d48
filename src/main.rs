use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use v2ex_explore::config::Config;
use v2ex_explore::crawler::search::SearchQuery;
use v2ex_explore::crawler::V2exClient;
use v2ex_explore::error::{Error, V2exErrorTrait};
use v2ex_explore::models::{NodeRef, SearchSort, Topic, TopicDetail};
use v2ex_explore::parser::fields::topic_id;
use v2ex_explore::parser::fragment_text;
use v2ex_explore::session::{JsonFileStore, Session};
use v2ex_explore::utils::error::{ClientError, ParseError};
use v2ex_explore::utils::truncate_text;

#[derive(Parser)]
#[command(
    name = "v2ex",
    version,
    about = "Read V2EX topics, replies and nodes from the terminal",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configuration
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List topics of a front-page tab
    Tab {
        /// Tab name (tech, creative, play, apple, jobs, deals, city, qna, hot, all, r2)
        #[arg(default_value = "all")]
        tab: String,
    },

    /// List topics of a node
    Node {
        /// Node name as in /go/{name}
        name: String,
    },

    /// Show a topic with all of its replies
    Topic {
        /// Topic id or link
        topic: String,
    },

    /// List every node on the site
    Nodes,

    /// List the nodes you collected
    MyNodes,

    /// Full-text search
    Search {
        /// Search terms
        query: String,

        /// Result ordering
        #[arg(long, value_enum, default_value = "sumup")]
        sort: SortArg,

        /// Offset of the first result
        #[arg(long, default_value = "0")]
        from: u32,

        /// Number of results
        #[arg(long, default_value = "10")]
        size: u32,
    },

    /// Store a session cookie after checking it is signed in
    Login {
        /// Cookie header value copied from the browser
        credential: String,
    },

    /// Forget the stored session cookie
    Logout,

    /// Redeem the daily sign-in reward
    Daily,

    /// Reply to a topic
    Reply {
        /// Topic id or link
        topic: String,

        /// Reply text
        content: String,
    },

    /// Thank the author of a reply
    ThankReply {
        /// Topic id or link the reply belongs to
        topic: String,

        /// Reply id (from `topic --json`)
        reply_id: String,
    },

    /// Thank the author of a topic
    ThankTopic {
        /// Topic id or link
        topic: String,
    },

    /// Collect a topic, or uncollect it with --remove
    Collect {
        /// Topic id or link
        topic: String,

        #[arg(long)]
        remove: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Sumup,
    Created,
}

impl From<SortArg> for SearchSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Sumup => Self::Sumup,
            SortArg::Created => Self::Created,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;

    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    let store = JsonFileStore::new(&config.session.state_path);
    let session = Arc::new(Session::open(store).context("Failed to load session state")?);
    let client = V2exClient::new(&config, session).context("Failed to create client")?;

    if let Err(e) = run(cli.command, &client, cli.json).await {
        let err = Error::from(e);
        tracing::debug!(category = ?err.category(), recoverable = err.is_recoverable(), "{err}");
        eprintln!("error: {}", err.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, client: &V2exClient, json: bool) -> Result<(), ClientError> {
    match command {
        Commands::Tab { tab } => {
            let topics = client.tab_topics(&tab).await?;
            output(json, &topics, |t| print_topics(t))?;
        }

        Commands::Node { name } => {
            let listing = client.node_topics(&name).await?;
            output(json, &listing, |listing| {
                println!("{} ({})", listing.node.title, listing.node.name);
                print_topics(&listing.topics);
            })?;
        }

        Commands::Topic { topic } => {
            let detail = client.topic_detail(parse_topic_arg(&topic)?).await?;
            output(json, &detail, print_detail)?;
        }

        Commands::Nodes => {
            let nodes = client.all_nodes().await?;
            output(json, &nodes, |n| print_nodes(n))?;
        }

        Commands::MyNodes => {
            let nodes = client.collected_nodes().await?;
            output(json, &nodes, |n| print_nodes(n))?;
        }

        Commands::Search {
            query,
            sort,
            from,
            size,
        } => {
            let hits = client
                .search(SearchQuery {
                    q: &query,
                    sort: sort.into(),
                    from,
                    size,
                })
                .await?;
            output(json, &hits, |hits| {
                for hit in hits {
                    println!("{:>8}  {}  ({} replies, {})", hit.id, hit.title, hit.replies, hit.member);
                }
            })?;
        }

        Commands::Login { credential } => {
            if client.check_credential(&credential).await? {
                client.session().set_credential(&credential)?;
                println!("Signed in; credential saved");
            } else {
                println!("The site did not accept this credential");
            }
        }

        Commands::Logout => {
            client.session().clear_credential()?;
            println!("Credential removed");
        }

        Commands::Daily => {
            let outcome = client.daily_checkin().await?;
            println!("{outcome}");
        }

        Commands::Reply { topic, content } => {
            let id = parse_topic_arg(&topic)?;
            let detail = client.topic_detail(id).await?;
            let once = detail.once.ok_or(ParseError::MissingElement("once"))?;
            client.post_reply(id, &content, &once).await?;
            println!("Reply posted to {}", detail.link);
        }

        Commands::ThankReply { topic, reply_id } => {
            let detail = client.topic_detail(parse_topic_arg(&topic)?).await?;
            let once = detail.once.ok_or(ParseError::MissingElement("once"))?;
            let response = client.thank_reply(&reply_id, &once).await?;
            println!("{}", if response.success { "Thanks sent" } else { "Thanks not sent" });
        }

        Commands::ThankTopic { topic } => {
            let id = parse_topic_arg(&topic)?;
            let detail = client.topic_detail(id).await?;
            if !detail.can_thank {
                println!("This topic cannot be thanked");
                return Ok(());
            }
            let once = detail.once.ok_or(ParseError::MissingElement("once"))?;
            let response = client.thank_topic(id, &once).await?;
            println!("{}", if response.success { "Thanks sent" } else { "Thanks not sent" });
        }

        Commands::Collect { topic, remove } => {
            let id = parse_topic_arg(&topic)?;
            let detail = client.topic_detail(id).await?;
            let t = detail
                .collect_param_t
                .ok_or(ParseError::MissingElement("collect toggle"))?;
            client.set_collected(id, !remove, &t).await?;
            println!("{}", if remove { "Topic uncollected" } else { "Topic collected" });
        }
    }

    Ok(())
}

/// Accept a bare id or any link containing `/t/{id}`
fn parse_topic_arg(arg: &str) -> Result<u64, ParseError> {
    arg.trim()
        .parse()
        .ok()
        .or_else(|| topic_id(arg))
        .ok_or_else(|| ParseError::InvalidTopicLink(arg.to_string()))
}

fn output<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<(), ClientError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

fn print_topics(topics: &[Topic]) {
    for topic in topics {
        println!("{:>8}  [{}] {}", topic.id, topic.node.title, topic.title);
    }
}

fn print_nodes(nodes: &[NodeRef]) {
    for node in nodes {
        println!("{:<24} {}", node.name, node.title);
    }
}

fn print_detail(detail: &TopicDetail) {
    println!("{}", detail.title);
    println!(
        "{} · {} · {} views · [{}]",
        detail.author_name, detail.display_time, detail.visit_count, detail.node.title
    );
    println!("{}", detail.link);
    println!();
    println!("{}", fragment_text(&detail.content));

    for (i, append) in detail.appends.iter().enumerate() {
        println!();
        println!("-- append {} ({})", i + 1, append.time);
        println!("{}", fragment_text(&append.content));
    }

    println!();
    println!(
        "{} replies · {} collected · {} thanks",
        detail.reply_count, detail.collect_count, detail.thank_count
    );
    for reply in &detail.replies {
        println!();
        println!(
            "#{} {} · {}{}",
            reply.floor,
            fragment_text(&reply.user_name),
            reply.time,
            if reply.thanks > 0 { format!(" · ♥ {}", reply.thanks) } else { String::new() }
        );
        println!("{}", truncate_text(&fragment_text(&reply.content), 2000));
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("v2ex_explore=debug,v2ex=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("v2ex_explore={level},warn")))
    };

    // Logs go to stderr so JSON records on stdout stay parseable
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
