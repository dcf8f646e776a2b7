#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use territory::{
    init_logging, play_local, print_match, AiPlayer, CliPlayer, MatchReport, Player, PlayerNode,
    Relay, RelayConfig, Role, Session, TransportConfig,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::sync::oneshot;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Play a hot-seat match on this machine.
    Local {
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        blue: PlayerType,
        #[arg(long, value_enum, default_value_t = PlayerType::Ai)]
        black: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Run the room relay.
    Relay {
        #[arg(long, default_value = territory::relay::config::DEFAULT_BIND)]
        bind: String,
        #[arg(long, default_value_t = 300)]
        room_timeout_secs: u64,
        #[arg(long, default_value_t = 5)]
        sweep_secs: u64,
    },
    /// Create a room on a relay and play blue.
    Host {
        #[arg(long, default_value = "127.0.0.1:3001")]
        connect: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Join a room on a relay and play black.
    Join {
        #[arg(long, default_value = "127.0.0.1:3001")]
        connect: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
fn make_player(kind: PlayerType) -> Box<dyn Player> {
    match kind {
        PlayerType::Human => Box::new(CliPlayer::new()),
        PlayerType::Ai => Box::new(AiPlayer::new()),
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { blue, black, seed } => {
            println!("Starting local match: blue ({:?}) vs black ({:?})", blue, black);
            let mut rng = make_rng(seed);
            let mut blue = make_player(blue);
            let mut black = make_player(black);
            let game = play_local(blue.as_mut(), black.as_mut(), &mut rng)?;
            println!("\n=== GAME OVER ===\n");
            print_match(game.state(), &[]);
            if let Some(winner) = game.winner() {
                println!("\n{} wins after {} moves.", winner, game.history().len());
            }
        }
        Commands::Relay {
            bind,
            room_timeout_secs,
            sweep_secs,
        } => {
            let config = RelayConfig::default()
                .with_bind(bind)
                .with_room_timeout(Duration::from_secs(room_timeout_secs))
                .with_sweep_interval(Duration::from_secs(sweep_secs.max(1)));
            Relay::new(config).bind_and_serve().await?;
        }
        Commands::Host {
            connect,
            name,
            player,
            seed,
        } => {
            println!("Connecting to relay at {}...", connect);
            let session = Session::connect_tcp(&connect, &name, TransportConfig::default()).await?;
            let mut rng = make_rng(seed);
            let (tx, rx) = oneshot::channel();
            tokio::spawn(async move {
                if let Ok(code) = rx.await {
                    println!("Room code: {} (share it with your opponent)", code);
                }
            });
            let mut node = PlayerNode::new(make_player(player), session);
            match node.run(&mut rng, Role::Host(Some(tx))).await {
                Ok(report) => print_report(&report),
                Err(e) => eprintln!("Game ended with an error: {}", e),
            }
            node.into_session().close().await;
        }
        Commands::Join {
            connect,
            code,
            name,
            player,
            seed,
        } => {
            println!("Connecting to relay at {}...", connect);
            let session = Session::connect_tcp(&connect, &name, TransportConfig::default()).await?;
            let mut rng = make_rng(seed);
            let mut node = PlayerNode::new(make_player(player), session);
            match node.run(&mut rng, Role::Join(code)).await {
                Ok(report) => print_report(&report),
                Err(e) => eprintln!("Game ended with an error: {}", e),
            }
            node.into_session().close().await;
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
fn print_report(report: &MatchReport) {
    println!("\n=== GAME OVER ===");
    println!(
        "{} (blue) vs {} (black) in room {}, {} moves",
        report.names.blue, report.names.black, report.code, report.moves
    );
    if report.won() {
        println!("You win!");
    } else {
        println!("{} wins.", report.names.of(report.winner));
    }
}
