mod dot;

use std::io::Write as _;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chord_ring::constants::STABILIZE_INTERVAL_MS;
use chord_ring::{Network, Stabilizer};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const BANNER: &str = r#"
  ____ _   _  ___  ____  ____
 / ___| | | |/ _ \|  _ \|  _ \
| |   | |_| | | | | |_) | | | |
| |___|  _  | |_| |  _ <| |_| |
 \____|_| |_|\___/|_| \_\____/
"#;

const MENU: &str = "\
================================================
1. insert a node
2. find data
3. insert data
4. export the ring as graph.dot
5. print the network summary
6. delete a node
7. find data (show the lookup path)
8. dump the ring state as ring_state.json
9. quit
================================================";

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive single-process chord ring simulator")]
struct Args {
    /// Ring order m; the ring holds 2^m identifiers
    #[arg(short = 'm', long, default_value_t = 6)]
    ring_order: u32,

    /// Number of nodes to bootstrap, with ids 0..nodes
    #[arg(short, long, default_value_t = 10)]
    nodes: u64,

    /// Number of generated data keys to insert after bootstrap
    #[arg(short, long, default_value_t = 0)]
    data: usize,

    /// Period of the background finger-repair task, in milliseconds
    #[arg(long, default_value_t = STABILIZE_INTERVAL_MS)]
    stabilize_interval_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("{BANNER}");
    if args.nodes == 0 {
        bail!("at least one node is required");
    }

    let network = Network::new(args.ring_order, 0).await?;
    let capacity = network.space().ring_size();
    println!("[!] creating a network with a capacity of {capacity} nodes");
    if args.nodes > capacity {
        bail!("node count {} exceeds the ring capacity {capacity}", args.nodes);
    }

    let started = Instant::now();
    let joined = network.insert_nodes((1..args.nodes).collect()).await;
    println!(
        "[+] ring bootstrapped with {} nodes in {:.3?}",
        joined + 1,
        started.elapsed()
    );

    if args.data > 0 {
        let started = Instant::now();
        let inserted = network.generate_fake_data(args.data).await?;
        println!(
            "[+] inserted {inserted} generated keys in {:.3?}",
            started.elapsed()
        );
    }

    let stabilizer = Stabilizer::spawn(
        network.clone(),
        Duration::from_millis(args.stabilize_interval_ms),
    );
    run_menu(&network).await?;
    stabilizer.shutdown().await;
    Ok(())
}

async fn run_menu(network: &Network) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("{MENU}");
        let Some(choice) = prompt(&mut lines, "choose an operation: ").await? else {
            return Ok(());
        };

        match choice.trim() {
            "1" => {
                let Some(id) = prompt_id(&mut lines, "[->] node id to insert: ").await? else {
                    continue;
                };
                let started = Instant::now();
                match network.insert_node(id).await {
                    Ok(()) => println!("[+] node {id} joined ({:.3?})", started.elapsed()),
                    Err(error) => println!("[-] {error}"),
                }
            }
            "2" => {
                let Some(query) = prompt(&mut lines, "[->] data to search: ").await? else {
                    return Ok(());
                };
                let started = Instant::now();
                match network.find_data(query.trim()).await {
                    Ok(location) => println!(
                        "[+] found '{}' with id {} at node {} ({:.3?})",
                        location.value,
                        location.key,
                        location.node,
                        started.elapsed()
                    ),
                    Err(error) => println!("[-] {error}"),
                }
            }
            "3" => {
                let Some(query) = prompt(&mut lines, "[->] data to insert: ").await? else {
                    return Ok(());
                };
                let started = Instant::now();
                match network.insert_data(query.trim()).await {
                    Ok(location) => println!(
                        "[+] stored '{}' under id {} at node {} ({:.3?})",
                        location.value,
                        location.key,
                        location.node,
                        started.elapsed()
                    ),
                    Err(error) => println!("[-] {error}"),
                }
            }
            "4" => {
                let exports = network.export().await;
                match std::fs::write("graph.dot", dot::render(&exports)) {
                    Ok(()) => println!("[+] wrote graph.dot ({} nodes)", exports.len()),
                    Err(error) => println!("[-] could not write graph.dot: {error}"),
                }
            }
            "5" => {
                println!("{}", network.summary().await);
            }
            "6" => {
                let Some(id) = prompt_id(&mut lines, "[->] node id to delete: ").await? else {
                    continue;
                };
                let started = Instant::now();
                match network.delete_node(id).await {
                    Ok(()) => println!("[+] node {id} removed ({:.3?})", started.elapsed()),
                    Err(error) => println!("[-] {error}"),
                }
            }
            "7" => {
                let Some(query) = prompt(&mut lines, "[->] data to search: ").await? else {
                    return Ok(());
                };
                let started = Instant::now();
                match network.find_data_with_path(query.trim()).await {
                    Ok((location, path)) => {
                        println!(
                            "[+] found '{}' with id {} at node {} ({:.3?})",
                            location.value,
                            location.key,
                            location.node,
                            started.elapsed()
                        );
                        let hops: Vec<String> = path.iter().map(u64::to_string).collect();
                        println!("    path: {}", hops.join(" -> "));
                    }
                    Err(error) => println!("[-] {error}"),
                }
            }
            "8" => {
                let exports = network.export().await;
                match serde_json::to_string_pretty(&exports) {
                    Ok(json) => match std::fs::write("ring_state.json", json) {
                        Ok(()) => {
                            println!("[+] wrote ring_state.json ({} nodes)", exports.len())
                        }
                        Err(error) => println!("[-] could not write ring_state.json: {error}"),
                    },
                    Err(error) => println!("[-] {error}"),
                }
            }
            "9" => return Ok(()),
            other => println!("[-] unknown option '{other}'"),
        }
        println!();
    }
}

async fn prompt(
    lines: &mut Lines<BufReader<Stdin>>,
    message: &str,
) -> anyhow::Result<Option<String>> {
    print!("{message}");
    std::io::stdout().flush().context("flushing stdout")?;
    lines.next_line().await.context("reading stdin")
}

async fn prompt_id(
    lines: &mut Lines<BufReader<Stdin>>,
    message: &str,
) -> anyhow::Result<Option<u64>> {
    let Some(input) = prompt(lines, message).await? else {
        return Ok(None);
    };
    match input.trim().parse::<u64>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            println!("[-] '{}' is not a node id", input.trim());
            Ok(None)
        }
    }
}
