use territory::{AiPlayer, MatchReport, PlayerNode, Relay, RelayConfig, Role, Session};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    territory::init_logging();
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);

    let relay = Relay::new(RelayConfig::default());
    let host = Session::new(Box::new(relay.connect_in_memory()), "Blue AI")?;
    let guest = Session::new(Box::new(relay.connect_in_memory()), "Black AI")?;

    let (code_tx, code_rx) = oneshot::channel();

    let f1 = async move {
        let mut node = PlayerNode::new(Box::new(AiPlayer::new()), host);
        let report = node.run(&mut rng1, Role::Host(Some(code_tx))).await?;
        Ok::<(MatchReport, PlayerNode), anyhow::Error>((report, node))
    };

    let f2 = async move {
        let code = code_rx.await?;
        let mut node = PlayerNode::new(Box::new(AiPlayer::new()), guest);
        let report = node.run(&mut rng2, Role::Join(code.to_string())).await?;
        Ok::<(MatchReport, PlayerNode), anyhow::Error>((report, node))
    };

    // Nodes are kept alive until both have seen the end of the match.
    let ((blue, _n1), (black, _n2)) = tokio::try_join!(f1, f2)?;

    let result = json!({
        "winner": blue.winner.as_str(),
        "moves": blue.moves,
        "blue": {"name": blue.names.blue, "won": blue.won(), "moves": blue.moves},
        "black": {"name": black.names.black, "won": black.won(), "moves": black.moves},
        "converged": blue.fingerprint == black.fingerprint && blue.winner == black.winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
