//! Distributed dispatcher.
//!
//! Runs the five-phase rebalance-and-filter protocol (`main_mpi.cpp`'s
//! `findingGene`) for one sequence across `w` simulated ranks. Ranks are
//! OS threads instead of MPI processes, connected by `crossbeam_channel`s:
//! one unbounded channel per (donor, recipient) ordered pair for range
//! transfers, plus coordinator-side channels for the two collective
//! barriers (size exchange before Phase B, survivor-count exchange before
//! Phase E).

use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::config::Config;
use crate::error::GenefindError;
use crate::orf;
use crate::predicate::GenePredicate;
use crate::types::{GeneRange, Sequence};

/// The six reading frames, in the order Phase A scans them.
pub const FRAMES: [i8; 6] = [-3, -2, -1, 1, 2, 3];

/// Rank `r`'s share of `total` items under the balanced partition: the
/// first `total % w` ranks get `ceil(total / w)`, the rest `floor`.
fn job_count(total: usize, rank: usize, w: usize) -> usize {
    let base = total / w;
    let extra = if rank < total % w { 1 } else { 0 };
    base + extra
}

/// The half-open `[start, end)` slice of `[0, total)` rank `r` owns.
fn partition_bounds(total: usize, w: usize, rank: usize) -> (usize, usize) {
    let start: usize = (0..rank).map(|r| job_count(total, r, w)).sum();
    let end = start + job_count(total, rank, w);
    (start, end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transfer {
    donor: usize,
    recipient: usize,
    count: usize,
}

/// Phase B's rebalancing plan: repeatedly pair a donor (`|L_r| > T_r`)
/// with a recipient (`|L_r| < T_r`) and schedule the largest transfer
/// that does not overshoot either target, until every rank matches its
/// target. Terminates because each step strictly reduces the total
/// surplus `Σ max(0, sizes[r] - target[r])`.
fn plan_transfers(sizes: &[usize]) -> Vec<Transfer> {
    let w = sizes.len();
    let total: usize = sizes.iter().sum();
    let targets: Vec<usize> = (0..w).map(|r| job_count(total, r, w)).collect();
    let mut counts = sizes.to_vec();
    let mut plan = Vec::new();

    loop {
        let donor = (0..w).find(|&r| counts[r] > targets[r]);
        let recipient = (0..w).find(|&r| counts[r] < targets[r]);
        let (Some(d), Some(r)) = (donor, recipient) else {
            break;
        };
        let amount = (counts[d] - targets[d]).min(targets[r] - counts[r]);
        counts[d] -= amount;
        counts[r] += amount;
        plan.push(Transfer {
            donor: d,
            recipient: r,
            count: amount,
        });
    }

    plan
}

/// The channel endpoints one rank needs to participate in the protocol.
///
/// `tx_row`/`rx_col` each hold exactly the point-to-point endpoints this
/// rank can use: `tx_row[recipient]` to send as a donor, `rx_col[donor]`
/// to receive as a recipient. Ownership of each mesh cell is moved to
/// its single user (never cloned), so a crashed peer drops its end and
/// the channel disconnects cleanly instead of leaving a phantom sender
/// alive elsewhere.
struct RankIo {
    size_tx: Sender<(usize, usize)>,
    size_rx: Option<Receiver<(usize, usize)>>,
    plan_tx: Option<Vec<Sender<Vec<Transfer>>>>,
    plan_rx: Receiver<Vec<Transfer>>,
    tx_row: Vec<Option<Sender<Vec<GeneRange>>>>,
    rx_col: Vec<Option<Receiver<Vec<GeneRange>>>>,
    gene_count_tx: Sender<(usize, usize)>,
    gene_count_rx: Option<Receiver<(usize, usize)>>,
    gather_tx: Sender<(usize, Vec<GeneRange>)>,
    gather_rx: Option<Receiver<(usize, Vec<GeneRange>)>>,
}

/// Run the five-phase protocol over `seq` with `workers` simulated ranks,
/// returning rank 0's gathered, filtered survivors.
pub fn run_distributed(
    seq: &Sequence,
    config: &Config,
    predicate: &dyn GenePredicate,
    workers: usize,
) -> Result<Vec<GeneRange>, GenefindError> {
    let w = workers.max(1);

    let (size_tx, size_rx) = unbounded();
    let (gene_count_tx, gene_count_rx) = unbounded();
    let (gather_tx, gather_rx) = unbounded();

    let mut plan_txs = Vec::with_capacity(w);
    let mut plan_rxs: Vec<Receiver<Vec<Transfer>>> = Vec::with_capacity(w);
    for _ in 0..w {
        let (tx, rx) = unbounded();
        plan_txs.push(tx);
        plan_rxs.push(rx);
    }

    // Mesh of point-to-point range-transfer channels, one per ordered
    // (donor, recipient) pair. Each cell's sender and receiver are moved
    // into exactly one rank's `tx_row`/`rx_col` below — never cloned.
    let mut mesh_tx: Vec<Vec<Option<Sender<Vec<GeneRange>>>>> = (0..w).map(|_| vec![None; w]).collect();
    let mut mesh_rx: Vec<Vec<Option<Receiver<Vec<GeneRange>>>>> = (0..w).map(|_| vec![None; w]).collect();
    for d in 0..w {
        for r in 0..w {
            if d != r {
                let (tx, rx) = unbounded();
                mesh_tx[d][r] = Some(tx);
                mesh_rx[d][r] = Some(rx);
            }
        }
    }

    let mut tx_rows: Vec<Vec<Option<Sender<Vec<GeneRange>>>>> = mesh_tx;
    let mut rx_cols: Vec<Vec<Option<Receiver<Vec<GeneRange>>>>> = (0..w)
        .map(|r| (0..w).map(|d| mesh_rx[d][r].take()).collect())
        .collect();

    let mut plan_tx_slot = Some(plan_txs);

    let mut result: Option<Result<Vec<GeneRange>, GenefindError>> = None;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(w);
        for (rank, plan_rx) in plan_rxs.into_iter().enumerate() {
            let io = RankIo {
                size_tx: size_tx.clone(),
                size_rx: (rank == 0).then(|| size_rx.clone()),
                plan_tx: if rank == 0 { plan_tx_slot.take() } else { None },
                plan_rx,
                tx_row: std::mem::take(&mut tx_rows[rank]),
                rx_col: std::mem::take(&mut rx_cols[rank]),
                gene_count_tx: gene_count_tx.clone(),
                gene_count_rx: (rank == 0).then(|| gene_count_rx.clone()),
                gather_tx: gather_tx.clone(),
                gather_rx: (rank == 0).then(|| gather_rx.clone()),
            };
            handles.push(scope.spawn(move || rank_main(rank, w, seq, config, predicate, io)));
        }
        for handle in handles {
            let outcome = handle.join().expect("dispatcher rank thread panicked");
            if let Ok(Some(gathered)) = &outcome {
                result = Some(Ok(gathered.clone()));
            } else if let Err(e) = outcome {
                result = Some(Err(e));
            }
        }
    });

    result.unwrap_or_else(|| Ok(Vec::new()))
}

fn rank_main(
    rank: usize,
    w: usize,
    seq: &Sequence,
    config: &Config,
    predicate: &dyn GenePredicate,
    io: RankIo,
) -> Result<Option<Vec<GeneRange>>, GenefindError> {
    // Phase A: local extraction over this rank's slice of the sequence,
    // across all six frames.
    let (lo, hi) = partition_bounds(seq.len(), w, rank);
    let mut local = Vec::new();
    for frame in FRAMES {
        local.extend(orf::extract(seq, frame, lo, hi)?);
    }

    // Phase B: report local size; coordinator plans the rebalance.
    io.size_tx
        .send((rank, local.len()))
        .expect("size report channel closed");

    let my_plan = if rank == 0 {
        let size_rx = io.size_rx.as_ref().expect("coordinator missing size_rx");
        let mut sizes = vec![0usize; w];
        for _ in 0..w {
            let (r, n) = size_rx.recv().expect("size report channel closed");
            sizes[r] = n;
        }
        let plan = plan_transfers(&sizes);
        let plan_tx = io.plan_tx.as_ref().expect("coordinator missing plan_tx");
        for r in 0..w {
            let my: Vec<Transfer> = plan
                .iter()
                .copied()
                .filter(|t| t.donor == r || t.recipient == r)
                .collect();
            plan_tx[r]
                .send(my)
                .expect("plan channel closed before rank read it");
        }
        io.plan_rx.recv().expect("plan channel closed")
    } else {
        io.plan_rx.recv().expect("plan channel closed")
    };

    // Phase C: execute this rank's transfers in plan order.
    for t in my_plan {
        if t.donor == rank {
            let mut batch = Vec::with_capacity(t.count);
            for _ in 0..t.count {
                batch.push(local.pop().expect("donor rank ran out of ranges"));
            }
            io.tx_row[t.recipient]
                .as_ref()
                .expect("missing donor->recipient channel")
                .send(batch)
                .expect("transfer channel closed");
        } else {
            let batch = io.rx_col[t.donor]
                .as_ref()
                .expect("missing donor->recipient channel")
                .recv()
                .expect("transfer channel closed");
            if batch.len() != t.count {
                return Err(GenefindError::TransferMismatch {
                    peer: t.donor,
                    expected: t.count,
                    actual: batch.len(),
                });
            }
            local.extend(batch);
        }
    }

    // Phase D: filter this rank's (now-rebalanced) local list.
    let span = local.len();
    let survivors = crate::filter::filter(&local, 0, span, seq, config, predicate);

    // Phase E: report survivor count (barrier), then gather to rank 0.
    io.gene_count_tx
        .send((rank, survivors.len()))
        .expect("gene count channel closed");

    if rank == 0 {
        let gene_count_rx = io
            .gene_count_rx
            .as_ref()
            .expect("coordinator missing gene_count_rx");
        let mut total = 0usize;
        for _ in 0..w {
            let (_, n) = gene_count_rx.recv().expect("gene count channel closed");
            total += n;
        }

        let mut gathered = survivors;
        let gather_rx = io.gather_rx.as_ref().expect("coordinator missing gather_rx");
        for _ in 0..(w - 1) {
            let (_, mut theirs) = gather_rx.recv().expect("gather channel closed");
            gathered.append(&mut theirs);
        }
        debug_assert_eq!(gathered.len(), total, "gather count does not match reported total");
        Ok(Some(gathered))
    } else {
        io.gather_tx
            .send((rank, survivors))
            .expect("gather channel closed");
        Ok(None)
    }
}
