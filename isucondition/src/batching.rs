use crate::db::insert_conditions;
use crate::metrics::{BATCH_SIZE, CONDITIONS_DROPPED_TOTAL, INGEST_LATENCY_SECONDS};
use crate::model::IsuCondition;
use sqlx::PgPool;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant};
use tracing::{debug, error, info};

pub async fn run_batcher(
    mut rx: mpsc::Receiver<IsuCondition>,
    pool: PgPool,
    max_batch: usize,
    max_wait_ms: u64,
) {
    info!(
        "Starting condition batcher with max_batch={}, max_wait_ms={}",
        max_batch, max_wait_ms
    );

    let mut buffer: Vec<IsuCondition> = Vec::with_capacity(max_batch);
    let mut ticker = interval(Duration::from_millis(max_wait_ms.max(1)));

    loop {
        tokio::select! {
            condition = rx.recv() => {
                match condition {
                    Some(c) => {
                        buffer.push(c);
                        if buffer.len() >= max_batch {
                            flush_batch(&pool, &mut buffer).await;
                        }
                    }
                    None => {
                        info!("Condition queue closed, flushing remaining batch");
                        flush_batch(&pool, &mut buffer).await;
                        break;
                    }
                }
            }

            _ = ticker.tick() => {
                if !buffer.is_empty() {
                    flush_batch(&pool, &mut buffer).await;
                }
            }
        }
    }

    info!("Condition batcher stopped");
}

async fn flush_batch(pool: &PgPool, buffer: &mut Vec<IsuCondition>) {
    let batch_len = buffer.len();
    if batch_len == 0 {
        return;
    }

    debug!("Flushing batch of {} conditions", batch_len);
    BATCH_SIZE.set(batch_len as f64);

    let start = Instant::now();
    match insert_conditions(pool, buffer).await {
        Ok(()) => {
            let elapsed = start.elapsed().as_secs_f64();
            INGEST_LATENCY_SECONDS.observe(elapsed);
            debug!("Batch inserted in {:.3}s", elapsed);
        }
        Err(e) => {
            // Retries already happened in insert_conditions; keep the queue moving.
            error!("Failed to insert condition batch: {}", e);
            error!("{} conditions dropped due to persistent DB failure", batch_len);
            CONDITIONS_DROPPED_TOTAL.inc_by(batch_len as f64);
        }
    }

    buffer.clear();
    BATCH_SIZE.set(0.0);
}
