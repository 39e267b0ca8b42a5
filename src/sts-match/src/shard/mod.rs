//! Shard coordinator: partition one sequence across parallel workers with
//! enough overlap that no amplicon straddling a boundary can be missed,
//! then merge the per-worker buffers and drop the duplicated boundary hits.

use log::{debug, info};

use crate::catalog::StsCatalog;
use crate::scan::{self, Hit, ScanParams};

pub mod error;
pub use error::ShardError;

/// Sequences shorter than this are always scanned single-threaded.
pub const MIN_SEQ_LEN_FOR_THREADING: usize = 100_000;

/// One worker's slice of the sequence, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shard {
    pub offset: usize,
    pub len: usize,
}

/// The computed partition of one sequence.
#[derive(Debug)]
pub struct ShardPlan {
    pub overlap: usize,
    pub shards: Vec<Shard>,
}

impl ShardPlan {
    pub fn threads(&self) -> usize {
        self.shards.len()
    }
}

/// Divide `seq_len` bytes over up to `requested_threads` workers.
///
/// Adjacent shards share exactly `overlap` bytes, the span within which a
/// hit found by one worker is rediscovered by the next. The thread count
/// steps down until every worker keeps a chance to see the largest
/// possible amplicon inside its own chunk.
///
/// # Errors
/// When the overlap swallows the whole chunk with more than one thread
/// the parameters are incompatible: fewer threads, a smaller margin, or a
/// purged catalog are required.
pub fn plan_shards(
    seq_len: usize,
    requested_threads: usize,
    overlap: usize,
) -> Result<ShardPlan, ShardError> {
    let mut threads = requested_threads.max(1);
    if seq_len < MIN_SEQ_LEN_FOR_THREADING {
        if threads > 1 {
            info!("only one thread will be used: the sequence is small");
        }
        threads = 1;
    }
    while threads > 1 && (threads + 1) * overlap > seq_len {
        threads -= 1;
    }
    if threads == 1 {
        return Ok(ShardPlan { overlap, shards: vec![Shard { offset: 0, len: seq_len }] });
    }

    let spare = (seq_len - (threads + 1) * overlap) as f64;
    let chunk = (spare / threads as f64).ceil() as usize + 2 * overlap;
    if overlap >= chunk {
        return Err(ShardError::OverlapExceedsChunk { overlap, chunk });
    }

    let mut shards = Vec::with_capacity(threads);
    let mut offset = 0;
    for _ in 0..threads {
        // The final shard always runs to the end of the sequence.
        if shards.len() + 1 == threads || offset + chunk >= seq_len {
            shards.push(Shard { offset, len: seq_len - offset });
            break;
        }
        shards.push(Shard { offset, len: chunk });
        offset += chunk - overlap;
    }
    Ok(ShardPlan { overlap, shards })
}

/// Scan one whole sequence record: plan the shards, run one worker per
/// shard on a dedicated pool, then merge in shard order, dropping every
/// hit a previous shard's tail already covered.
pub fn scan_record(
    sequence: &[u8],
    catalog: &StsCatalog,
    params: &ScanParams,
    requested_threads: usize,
) -> Result<Vec<Hit>, ShardError> {
    let overlap = (catalog.max_pcr_size + params.margin).saturating_sub(1);
    let plan = plan_shards(sequence.len(), requested_threads, overlap)?;
    debug!(
        "scanning {} bytes over {} shard(s), overlap={}",
        sequence.len(),
        plan.threads(),
        plan.overlap
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.threads())
        .build()
        .map_err(ShardError::BuildThreadPool)?;

    let mut buffers: Vec<Vec<Hit>> = vec![Vec::new(); plan.shards.len()];
    pool.scope(|scope| {
        for (shard, buffer) in plan.shards.iter().zip(buffers.iter_mut()) {
            scope.spawn(move |_| {
                let slice = &sequence[shard.offset..shard.offset + shard.len];
                *buffer = scan::scan_shard(slice, catalog, params);
            });
        }
    });

    let mut merged = Vec::new();
    for (shard, buffer) in plan.shards.iter().zip(buffers) {
        for hit in buffer {
            // Anything this close to the leading edge of a later shard was
            // also found by the previous worker's tail.
            if shard.offset > 0 && hit.pos2 < plan.overlap {
                debug!("skipping redundant hit at offset {}", shard.offset + hit.pos1);
                continue;
            }
            merged.push(Hit {
                pos1: hit.pos1 + shard.offset,
                pos2: hit.pos2 + shard.offset,
                sts: hit.sts,
            });
        }
    }
    Ok(merged)
}
