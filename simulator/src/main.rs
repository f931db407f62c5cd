mod condition;

use chrono::Utc;
use clap::Parser;
use condition::{Condition, DeviceClock};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "simulator", about = "Posts random Isu condition reports")]
struct Args {
    /// Base URL of the isucondition server
    #[arg(long, env = "SERVER_URL", default_value = "http://localhost:3000")]
    server_url: String,

    /// User that owns the simulated devices
    #[arg(long, env = "JIA_USER_ID", default_value = "simulator")]
    user: String,

    /// Conditions per second across all devices
    #[arg(long, env = "RATE", default_value_t = 1000)]
    rate: u64,

    #[arg(long, env = "DEVICES", default_value_t = 100)]
    devices: usize,

    /// Conditions per POST request
    #[arg(long, env = "BATCH", default_value_t = 10)]
    batch: usize,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting Isu simulator");
    info!(
        "Server: {}, Rate: {} conditions/s, Devices: {}, Batch: {}",
        args.server_url, args.rate, args.devices, args.batch
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        });

    let run_id = uuid::Uuid::new_v4().simple().to_string();
    let start = Utc::now().timestamp();
    let mut clocks: Vec<DeviceClock> = (0..args.devices.max(1))
        .map(|i| DeviceClock::new(format!("{}-{}", &run_id[..8], i), start))
        .collect();

    for clock in &clocks {
        if let Err(e) = register_isu(&client, &args, &clock.jia_isu_uuid).await {
            error!("Failed to register {}: {}", clock.jia_isu_uuid, e);
            std::process::exit(1);
        }
    }
    info!("Registered {} devices, starting to post conditions", clocks.len());

    let mut rng = rand::thread_rng();
    let batch = args.batch.max(1);
    let burst_interval = Duration::from_millis((batch as u64 * 1000) / args.rate.max(1));
    let mut counter = 0u64;
    let mut device = 0usize;

    loop {
        let burst_start = std::time::Instant::now();

        let clock = &mut clocks[device];
        device = (device + 1) % args.devices.max(1);
        let conditions: Vec<Condition> =
            (0..batch).map(|_| clock.next_condition(&mut rng)).collect();

        match post_conditions(&client, &args.server_url, &clock.jia_isu_uuid, &conditions).await {
            Ok(()) => counter += conditions.len() as u64,
            Err(e) => warn!("Failed to post conditions for {}: {}", clock.jia_isu_uuid, e),
        }

        // Log progress periodically
        if counter > 0 && counter % 10000 < batch as u64 {
            info!("Posted {} conditions", counter);
        }

        let elapsed = burst_start.elapsed();
        if elapsed < burst_interval {
            tokio::time::sleep(burst_interval - elapsed).await;
        } else if elapsed > burst_interval * 2 {
            warn!(
                "Post took {:?}, target was {:?} - server may be overloaded",
                elapsed, burst_interval
            );
        }
    }
}

async fn register_isu(client: &Client, args: &Args, jia_isu_uuid: &str) -> reqwest::Result<()> {
    let response = client
        .post(format!("{}/api/isu", args.server_url))
        .header("x-jia-user-id", &args.user)
        .json(&serde_json::json!({
            "jia_isu_uuid": jia_isu_uuid,
            "isu_name": format!("sim {}", jia_isu_uuid),
            "character": "simulated",
        }))
        .send()
        .await?;

    if response.status() == StatusCode::CONFLICT {
        warn!("{} already registered", jia_isu_uuid);
        return Ok(());
    }
    response.error_for_status().map(|_| ())
}

async fn post_conditions(
    client: &Client,
    server_url: &str,
    jia_isu_uuid: &str,
    conditions: &[Condition],
) -> reqwest::Result<()> {
    client
        .post(format!("{}/api/condition/{}", server_url, jia_isu_uuid))
        .json(conditions)
        .send()
        .await?
        .error_for_status()
        .map(|_| ())
}
