/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::PositionCommit;
use crate::storage::FleetStore;
use crate::tools::prometheus::{QUEUE_COUNTER, QUEUE_DRAINER_LATENCY, TERMINATION};
use crate::{queue_drainer_latency, termination};
use std::sync::atomic::{AtomicBool, Ordering};
use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tokio::{sync::mpsc, time::Instant};
use tracing::info;

/// Applies queued commits to the store in arrival order, so the trip and
/// vehicle records converge on the newest fix (last write wins).
async fn drain_position_commits(position_commits: Vec<PositionCommit>, store: &FleetStore) {
    info!(
        tag = "[Queued Entries For Draining]",
        length = %position_commits.len(),
        "Writing queued position commits to the fleet store"
    );

    for commit in position_commits {
        store.record_position(commit).await;
    }
}

fn cleanup_drainer(
    drainer_size: &mut usize,
    position_commits: &mut Vec<PositionCommit>,
    start_time: &mut Instant,
) {
    queue_drainer_latency!("POSITION", start_time);
    *start_time = Instant::now();
    QUEUE_COUNTER.reset();
    *drainer_size = 0;
    position_commits.clear();
}

/// The single position-writer task: receives committed GPS updates from
/// the HTTP handlers over the channel and drains them to the fleet store
/// in batches, on a timer or when the batch fills up. On graceful
/// termination the remaining queue is force-drained before exit so no
/// accepted commit is lost.
pub async fn run_drainer(
    mut rx: mpsc::Receiver<PositionCommit>,
    graceful_termination_requested: Arc<AtomicBool>,
    drainer_capacity: usize,
    drainer_delay: u64,
    store: &FleetStore,
) {
    let mut position_commits: Vec<PositionCommit> = Vec::new();
    let mut timer = interval(Duration::from_secs(drainer_delay));
    let mut start_time = Instant::now();

    let mut drainer_size = 0;

    loop {
        if graceful_termination_requested.load(Ordering::Relaxed) {
            info!(tag = "[Graceful Shutting Down]", length = %drainer_size);
            if drainer_size > 0 {
                info!(tag = "[Force Draining Queue]", length = %drainer_size);
                let queue = std::mem::take(&mut position_commits);
                drain_position_commits(queue, store).await;
                cleanup_drainer(&mut drainer_size, &mut position_commits, &mut start_time);
            }
            termination!("POSITION_WRITER", start_time);
            break;
        }
        tokio::select! {
            item = rx.recv() => {
                match item {
                    Some(commit) => {
                        position_commits.push(commit);
                        drainer_size += 1;
                        QUEUE_COUNTER.inc();
                        if drainer_size >= drainer_capacity {
                            info!(tag = "[Force Draining Queue]", length = %drainer_size);
                            let queue = std::mem::take(&mut position_commits);
                            drain_position_commits(queue, store).await;
                            cleanup_drainer(&mut drainer_size, &mut position_commits, &mut start_time);
                        }
                    },
                    None => break,
                }
            },
            _ = timer.tick() => {
                if drainer_size > 0 {
                    info!(tag = "[Draining Queue]", length = %drainer_size);
                    let queue = std::mem::take(&mut position_commits);
                    drain_position_commits(queue, store).await;
                    cleanup_drainer(&mut drainer_size, &mut position_commits, &mut start_time);
                }
            },
        }
    }
}
