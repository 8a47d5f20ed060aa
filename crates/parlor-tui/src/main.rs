//! Parlor TUI entry point.

use clap::Parser;
use parlor_app::{GroupInfo, Reconciler, Runtime, Session};
use parlor_core::{ChannelName, Namespace, Pattern, StaticDirectory, UserId};
use parlor_pubsub::{Loopback, LoopbackConfig};
use parlor_tui::{TerminalDriver, peers};
use rand::Rng;

/// Parlor terminal chat client
#[derive(Parser, Debug)]
#[command(name = "parlor-tui")]
#[command(about = "Terminal chat client over an in-process pub/sub broker")]
#[command(version)]
struct Args {
    /// Own user id (numeric ids resolve names from the built-in directory).
    ///
    /// A random id is assigned if not provided.
    #[arg(short, long)]
    user: Option<String>,

    /// Number of simulated remote peers.
    #[arg(short, long, default_value_t = 3)]
    peers: usize,

    /// Occupancy threshold before presence switches to interval summaries.
    #[arg(long, default_value_t = 20)]
    announce_max: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to stderr only when asked; the TUI owns the screen otherwise.
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let args = Args::parse();

    let user_id = UserId::new(
        args.user.unwrap_or_else(|| rand::rng().random_range(1u64..=16).to_string()),
    );

    let broker = Loopback::new(LoopbackConfig {
        announce_max: args.announce_max,
        ..LoopbackConfig::default()
    });
    let client = broker.attach(user_id.clone());
    client.subscribe(
        &[Pattern::Namespace(Namespace::Public), Pattern::Namespace(Namespace::Direct)],
        true,
    );
    let _peers = peers::spawn(&broker, args.peers, user_id.clone());

    let directory = StaticDirectory::new();
    let session = Session::open(user_id, &directory);
    let groups = vec![
        GroupInfo {
            channel: ChannelName::public("global"),
            name: "Online Users".to_owned(),
            info: Some("All users currently online".to_owned()),
        },
        GroupInfo {
            channel: ChannelName::public("hallway"),
            name: "Hallway".to_owned(),
            info: None,
        },
    ];
    // A few well-known contacts appear in the list before any presence.
    let contacts = [UserId::new("400"), UserId::new("401"), UserId::new("402")];
    let reconciler = Reconciler::new(session, Box::new(directory), groups, &contacts);

    let driver = TerminalDriver::new(broker, client)?;
    Ok(Runtime::new(driver, reconciler).run().await?)
}
