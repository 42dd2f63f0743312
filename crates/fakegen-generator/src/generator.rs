//! Batch/stream controller.
//!
//! [`DataGenerator`] owns one run: the resolved plans, the seeded row
//! streams and the row cursor. It produces rows one at a time, groups them
//! into batches and hands each batch to a sink before producing the next, so
//! memory stays bounded by the batch size regardless of the row count.

use crate::assembler::assemble_row;
use crate::config::RunConfig;
use crate::error::{GenerationError, RunError};
use crate::plan::FieldPlan;
use crate::resolver::{effective_partitions, resolve_schema, ResolveContext};
use crate::rng::{worker_seed, ResolvedSeed, RowStreams};
use crate::sink::{BatchSink, SinkError};
use crate::unique::SharedKeys;
use fakegen_core::{Batch, Row, SchemaDefinition};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Cooperative cancellation flag, checked before each batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Runs stop before their next batch.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a completed or cancelled run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Seed the run used
    pub seed: u64,
    /// False when the seed came from the wall clock
    pub reproducible: bool,
    /// Index of the first row of the run's range
    pub first_row: u64,
    /// Rows delivered to the sink
    pub rows: u64,
    /// Batches delivered to the sink
    pub batches: u64,
    /// Whether the run stopped early on cancellation
    pub cancelled: bool,
}

/// State of one generation run.
#[derive(Debug)]
pub struct RunContext {
    seed: ResolvedSeed,
    streams: RowStreams,
    batch_size: usize,
    plans: Vec<FieldPlan>,
    start: u64,
    end: u64,
    index: u64,
    batches: u64,
}

impl RunContext {
    /// Seed in use.
    pub fn seed(&self) -> ResolvedSeed {
        self.seed
    }

    /// Resolved plans in schema order.
    pub fn plans(&self) -> &[FieldPlan] {
        &self.plans
    }

    /// Rows per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Row range this context covers.
    pub fn range(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// Data generator that produces deterministic rows for one schema.
///
/// Row `i` is generated from stream `i` of the seeded source, so the same
/// seed, schema and row count always yield the same rows.
#[derive(Debug)]
pub struct DataGenerator {
    collection: String,
    context: RunContext,
}

impl DataGenerator {
    /// Validate the schema and config and resolve every field's plan.
    pub fn new(schema: &SchemaDefinition, config: &RunConfig) -> Result<Self, RunError> {
        schema.validate()?;
        config.validate()?;

        let seed = ResolvedSeed::resolve(config.seed);
        if !seed.reproducible {
            warn!(
                seed = seed.value,
                "No seed configured; using a wall-clock seed, output is not reproducible"
            );
        }

        let ctx = ResolveContext::new(schema, config, seed.value);
        let plans = resolve_schema(schema, &ctx)?;
        Ok(Self::from_plans(schema, config, seed, plans, 0, config.total_rows))
    }

    /// Generator for one worker's slice of a multi-worker run.
    ///
    /// `seed` must be the run's seed, shared by every worker. `shared_keys`
    /// is used only when `scope.keys` is [`KeyScope::Shared`].
    pub fn for_worker(
        schema: &SchemaDefinition,
        config: &RunConfig,
        seed: ResolvedSeed,
        slice: WorkerSlice,
        scope: CrossRowScope,
        shared_keys: Option<SharedKeys>,
    ) -> Result<Self, RunError> {
        schema.validate()?;
        config.validate()?;
        if slice.end > config.total_rows || slice.start > slice.end {
            return Err(GenerationError::config(format!(
                "worker slice [{}, {}) is outside [0, {})",
                slice.start, slice.end, config.total_rows
            ))
            .into());
        }

        let (pool_rows, pool_seed) = match scope.pools {
            PoolScope::RunWide => (config.total_rows, seed.value),
            PoolScope::PerWorker => (slice.len(), worker_seed(seed.value, slice.worker)),
        };
        let ctx = ResolveContext {
            config,
            pool_rows,
            pool_seed,
            num_partitions: effective_partitions(schema, config),
            shared_keys: match scope.keys {
                KeyScope::Shared => shared_keys,
                KeyScope::PerWorker => None,
            },
        };
        let plans = resolve_schema(schema, &ctx)?;
        Ok(Self::from_plans(
            schema,
            config,
            seed,
            plans,
            slice.start,
            slice.end,
        ))
    }

    fn from_plans(
        schema: &SchemaDefinition,
        config: &RunConfig,
        seed: ResolvedSeed,
        plans: Vec<FieldPlan>,
        start: u64,
        end: u64,
    ) -> Self {
        Self {
            collection: schema.collection_name.clone(),
            context: RunContext {
                seed,
                streams: RowStreams::new(seed.value),
                batch_size: config.batch_size,
                plans,
                start,
                end,
                index: start,
                batches: 0,
            },
        }
    }

    /// Seed in use.
    pub fn seed(&self) -> ResolvedSeed {
        self.context.seed
    }

    /// The run's state.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Index of the next row to generate.
    pub fn current_index(&self) -> u64 {
        self.context.index
    }

    /// Rows left in this generator's range.
    pub fn remaining(&self) -> u64 {
        self.context.end - self.context.index
    }

    /// Generate the next row, or `None` once the range is exhausted.
    pub fn next_row(&mut self) -> Result<Option<Row>, GenerationError> {
        let ctx = &mut self.context;
        if ctx.index >= ctx.end {
            return Ok(None);
        }
        let index = ctx.index;
        let mut rng = ctx.streams.for_row(index);
        let row = assemble_row(&mut ctx.plans, &mut rng, index)?;
        ctx.index += 1;
        Ok(Some(row))
    }

    /// Generate the next batch, or `None` once the range is exhausted.
    pub fn next_batch(&mut self) -> Result<Option<Batch>, GenerationError> {
        let size = self.remaining().min(self.context.batch_size as u64) as usize;
        if size == 0 {
            return Ok(None);
        }

        let mut batch = Batch::with_capacity(self.context.batches, self.context.index, size);
        for _ in 0..size {
            match self.next_row()? {
                Some(row) => batch.rows.push(row),
                None => break,
            }
        }
        self.context.batches += 1;
        Ok(Some(batch))
    }

    /// Iterate over the remaining rows lazily.
    pub fn rows(&mut self) -> RowIterator<'_> {
        RowIterator { generator: self }
    }

    /// Stream every remaining batch into `sink`.
    ///
    /// Cancellation is checked before each batch; a cancelled run still
    /// calls `finish` so the sink can close what it already received.
    pub fn run<S: BatchSink>(
        &mut self,
        sink: S,
        cancel: &CancelToken,
    ) -> Result<RunSummary, RunError> {
        self.drive(sink, || cancel.is_cancelled())
    }

    fn drive<S, F>(&mut self, mut sink: S, stop: F) -> Result<RunSummary, RunError>
    where
        S: BatchSink,
        F: Fn() -> bool,
    {
        let seed = self.context.seed;
        let first_row = self.context.index;
        info!(
            collection = %self.collection,
            seed = seed.value,
            reproducible = seed.reproducible,
            first_row,
            rows = self.remaining(),
            batch_size = self.context.batch_size,
            "Starting generation"
        );

        let mut rows = 0u64;
        let mut batches = 0u64;
        let mut cancelled = false;
        loop {
            if stop() {
                cancelled = true;
                warn!(
                    collection = %self.collection,
                    rows_delivered = rows,
                    "Generation cancelled"
                );
                break;
            }
            let Some(batch) = self.next_batch()? else {
                break;
            };
            let len = batch.len() as u64;
            debug!(
                batch = batch.number,
                first_row = batch.first_row,
                rows = len,
                "Delivering batch"
            );
            sink.accept(batch)?;
            rows += len;
            batches += 1;
        }
        sink.finish()?;

        info!(
            collection = %self.collection,
            rows,
            batches,
            cancelled,
            "Generation finished"
        );
        Ok(RunSummary {
            seed: seed.value,
            reproducible: seed.reproducible,
            first_row,
            rows,
            batches,
            cancelled,
        })
    }
}

/// Iterator that lazily generates rows.
pub struct RowIterator<'a> {
    generator: &'a mut DataGenerator,
}

impl Iterator for RowIterator<'_> {
    type Item = Result<Row, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.generator.next_row().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.generator.remaining() as usize;
        (remaining, Some(remaining))
    }
}

// ============================================================================
// Multi-worker runs
// ============================================================================

/// Contiguous row range assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSlice {
    /// Worker index
    pub worker: usize,
    /// First row (inclusive)
    pub start: u64,
    /// Last row (exclusive)
    pub end: u64,
}

impl WorkerSlice {
    /// Rows in the slice.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Check if the slice holds no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `[0, total_rows)` into at most `workers` contiguous, non-empty
/// slices whose sizes differ by at most one.
pub fn split_rows(total_rows: u64, workers: usize) -> Vec<WorkerSlice> {
    let workers = (workers.max(1) as u64).min(total_rows.max(1));
    let base = total_rows / workers;
    let extra = total_rows % workers;

    let mut start = 0;
    (0..workers)
        .map(|worker| {
            let len = base + u64::from(worker < extra);
            let slice = WorkerSlice {
                worker: worker as usize,
                start,
                end: start + len,
            };
            start += len;
            slice
        })
        .collect()
}

/// How cardinality pools are built across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolScope {
    /// Every worker builds the same pool sized to the whole run.
    #[default]
    RunWide,
    /// Each worker builds its own pool sized to its slice.
    PerWorker,
}

/// How random-mode primary keys stay unique across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScope {
    /// One mutex-guarded seen set for all workers.
    #[default]
    Shared,
    /// A private seen set per worker; only valid for a single worker.
    PerWorker,
}

/// Cross-row state sharing for multi-worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrossRowScope {
    /// Cardinality pool scope
    pub pools: PoolScope,
    /// Primary-key seen-set scope
    pub keys: KeyScope,
}

/// Run `config.total_rows` rows on `workers` threads.
///
/// Each worker gets a contiguous slice and its own sink from `make_sink`.
/// The first error (by worker order) is returned; once any worker fails the
/// others stop before their next batch. Summaries are in worker order.
pub fn run_partitioned<S, F>(
    schema: &SchemaDefinition,
    config: &RunConfig,
    workers: usize,
    scope: CrossRowScope,
    make_sink: F,
    cancel: &CancelToken,
) -> Result<Vec<RunSummary>, RunError>
where
    S: BatchSink,
    F: Fn(&WorkerSlice) -> Result<S, SinkError> + Sync,
{
    schema.validate()?;
    config.validate()?;

    let slices = split_rows(config.total_rows, workers);
    let random_keys = schema.primary_field().is_some_and(|f| !f.auto_id);
    if slices.len() > 1 && random_keys && scope.keys == KeyScope::PerWorker {
        return Err(GenerationError::config(
            "random primary keys need KeyScope::Shared when running more than one worker",
        )
        .into());
    }

    let seed = ResolvedSeed::resolve(config.seed);
    if !seed.reproducible {
        warn!(
            seed = seed.value,
            "No seed configured; using a wall-clock seed, output is not reproducible"
        );
    }
    info!(
        workers = slices.len(),
        rows = config.total_rows,
        ?scope,
        "Starting partitioned generation"
    );

    let shared_keys: SharedKeys = Arc::new(Mutex::new(HashSet::new()));
    let abort = CancelToken::new();

    let results: Vec<Result<RunSummary, RunError>> = std::thread::scope(|s| {
        let handles: Vec<_> = slices
            .iter()
            .map(|slice| {
                let make_sink = &make_sink;
                let shared_keys = Arc::clone(&shared_keys);
                let abort = abort.clone();
                s.spawn(move || {
                    let result = run_worker(
                        schema,
                        config,
                        seed,
                        *slice,
                        scope,
                        shared_keys,
                        make_sink,
                        || cancel.is_cancelled() || abort.is_cancelled(),
                    );
                    if result.is_err() {
                        abort.cancel();
                    }
                    result
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    results.into_iter().collect()
}

#[allow(clippy::too_many_arguments)]
fn run_worker<S, F, C>(
    schema: &SchemaDefinition,
    config: &RunConfig,
    seed: ResolvedSeed,
    slice: WorkerSlice,
    scope: CrossRowScope,
    shared_keys: SharedKeys,
    make_sink: &F,
    stop: C,
) -> Result<RunSummary, RunError>
where
    S: BatchSink,
    F: Fn(&WorkerSlice) -> Result<S, SinkError>,
    C: Fn() -> bool,
{
    let mut generator =
        DataGenerator::for_worker(schema, config, seed, slice, scope, Some(shared_keys))?;
    let sink = make_sink(&slice)?;
    debug!(
        worker = slice.worker,
        start = slice.start,
        end = slice.end,
        "Worker started"
    );
    generator.drive(sink, stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectSink;
    use fakegen_core::FieldValue;

    fn test_schema() -> SchemaDefinition {
        SchemaDefinition::from_yaml(
            r#"
collection_name: articles
num_partitions: 8
fields:
  - name: id
    type: Int64
    is_primary: true
    auto_id: true
  - name: title
    type: VarChar
    max_length: 40
  - name: tenant
    type: Int32
    min: 0
    max: 100000
    is_partition_key: true
    cardinality_ratio: 0.1
  - name: rating
    type: Float
    min: 1.0
    max: 5.0
    nullable: true
  - name: embedding
    type: FloatVector
    dim: 8
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_generate_single_row() {
        let schema = test_schema();
        let mut generator = DataGenerator::new(&schema, &RunConfig::new(10).with_seed(42)).unwrap();

        let row = generator.next_row().unwrap().unwrap();
        assert_eq!(row.index, 0);
        assert_eq!(row.get("id"), Some(&FieldValue::Int(0)));
        assert!(row.get("title").unwrap().as_str().is_some());
        assert_eq!(row.get("embedding").unwrap().as_float_vector().unwrap().len(), 8);
        assert!(row.partition.unwrap() < 8);
    }

    #[test]
    fn test_deterministic_generation() {
        let schema = test_schema();
        let config = RunConfig::new(50).with_seed(42);

        let rows1: Vec<Row> = DataGenerator::new(&schema, &config)
            .unwrap()
            .rows()
            .collect::<Result<_, _>>()
            .unwrap();
        let rows2: Vec<Row> = DataGenerator::new(&schema, &config)
            .unwrap()
            .rows()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows1, rows2);

        let other: Vec<Row> = DataGenerator::new(&schema, &config.clone().with_seed(43))
            .unwrap()
            .rows()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_ne!(rows1, other);
    }

    #[test]
    fn test_batches_cover_range() {
        let schema = test_schema();
        let config = RunConfig::new(25).with_seed(1).with_batch_size(10);
        let mut generator = DataGenerator::new(&schema, &config).unwrap();

        let mut sink = CollectSink::new();
        let summary = generator.run(&mut sink, &CancelToken::new()).unwrap();

        let sizes: Vec<usize> = sink.batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, [10, 10, 5]);
        let firsts: Vec<u64> = sink.batches.iter().map(|b| b.first_row).collect();
        assert_eq!(firsts, [0, 10, 20]);
        assert!(sink.finished);

        assert_eq!(summary.rows, 25);
        assert_eq!(summary.batches, 3);
        assert!(!summary.cancelled);
        assert!(summary.reproducible);
        assert_eq!(summary.seed, 1);
        assert_eq!(generator.remaining(), 0);
    }

    #[test]
    fn test_current_index() {
        let schema = test_schema();
        let mut generator = DataGenerator::new(&schema, &RunConfig::new(5).with_seed(1)).unwrap();

        assert_eq!(generator.current_index(), 0);
        generator.next_row().unwrap();
        assert_eq!(generator.current_index(), 1);
        generator.next_batch().unwrap();
        assert_eq!(generator.current_index(), 5);
        assert!(generator.next_row().unwrap().is_none());
        assert!(generator.next_batch().unwrap().is_none());
    }

    #[test]
    fn test_cancel_before_start() {
        let schema = test_schema();
        let mut generator = DataGenerator::new(&schema, &RunConfig::new(100).with_seed(1)).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut sink = CollectSink::new();
        let summary = generator.run(&mut sink, &cancel).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.rows, 0);
        assert!(sink.batches.is_empty());
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let mut schema = test_schema();
        schema.fields[1].is_primary = true;
        let err = DataGenerator::new(&schema, &RunConfig::new(10)).unwrap_err();
        assert!(matches!(err, RunError::Schema(_)));
    }

    #[test]
    fn test_unseeded_run_is_not_reproducible() {
        let schema = test_schema();
        let generator = DataGenerator::new(&schema, &RunConfig::new(10)).unwrap();
        assert!(!generator.seed().reproducible);
    }

    #[test]
    fn test_split_rows() {
        let slices = split_rows(10, 3);
        let bounds: Vec<(u64, u64)> = slices.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(bounds, [(0, 4), (4, 7), (7, 10)]);

        assert_eq!(split_rows(2, 8).len(), 2);
        assert_eq!(split_rows(5, 0).len(), 1);
        assert_eq!(split_rows(5, 0)[0].len(), 5);
    }

    #[test]
    fn test_worker_concatenation_matches_single_thread() {
        let schema = test_schema();
        let config = RunConfig::new(103).with_seed(7).with_batch_size(16);

        let single: Vec<Row> = DataGenerator::new(&schema, &config)
            .unwrap()
            .rows()
            .collect::<Result<_, _>>()
            .unwrap();

        let sinks: Mutex<Vec<(usize, CollectSink)>> = Mutex::new(Vec::new());
        struct Forward<'a> {
            worker: usize,
            inner: CollectSink,
            out: &'a Mutex<Vec<(usize, CollectSink)>>,
        }
        impl BatchSink for Forward<'_> {
            fn accept(&mut self, batch: Batch) -> Result<(), SinkError> {
                self.inner.accept(batch)
            }
            fn finish(&mut self) -> Result<(), SinkError> {
                let inner = std::mem::take(&mut self.inner);
                self.out.lock().unwrap().push((self.worker, inner));
                Ok(())
            }
        }

        let summaries = run_partitioned(
            &schema,
            &config,
            4,
            CrossRowScope::default(),
            |slice| {
                Ok(Forward {
                    worker: slice.worker,
                    inner: CollectSink::new(),
                    out: &sinks,
                })
            },
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries.iter().map(|s| s.rows).sum::<u64>(), 103);

        let mut collected = sinks.into_inner().unwrap();
        collected.sort_by_key(|(worker, _)| *worker);
        let merged: Vec<Row> = collected
            .into_iter()
            .flat_map(|(_, sink)| sink.into_rows())
            .collect();
        assert_eq!(merged, single);
    }

    #[test]
    fn test_per_worker_keys_rejected_for_random_primary() {
        let schema = SchemaDefinition::from_yaml(
            "collection_name: c\nfields:\n  - {name: pk, type: VarChar, max_length: 16, is_primary: true}\n",
        )
        .unwrap();
        let scope = CrossRowScope {
            pools: PoolScope::RunWide,
            keys: KeyScope::PerWorker,
        };
        let err = run_partitioned(
            &schema,
            &RunConfig::new(100).with_seed(1),
            2,
            scope,
            |_| Ok(CollectSink::new()),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RunError::Generation(GenerationError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_per_worker_pools_change_cardinality() {
        let schema = test_schema();
        let config = RunConfig::new(1000).with_seed(3);
        let scope = CrossRowScope {
            pools: PoolScope::PerWorker,
            keys: KeyScope::Shared,
        };
        let slice = split_rows(1000, 4)[1];
        let generator =
            DataGenerator::for_worker(&schema, &config, ResolvedSeed::resolve(Some(3)), slice, scope, None)
                .unwrap();

        match generator.context().plans()[2].strategy() {
            crate::plan::Strategy::Pool(pool) => assert_eq!(pool.len(), 25),
            other => panic!("Expected pool, got {other:?}"),
        }
    }
}
