//! Integration tests for the block nested loop join.

use pagejoin_core::catalog::{ColumnType, Schema};
use pagejoin_core::iterator::{collect_records, RecordIterator};
use pagejoin_core::query::{
    estimate_bnlj_io_cost, explain, BnljOperator, ExecutionContext, MemorySource, QueryOperator,
    TableStats,
};
use pagejoin_core::storage::{records_per_page, ExecutionConfig, NullEquality};
use pagejoin_core::Error;
use pagejoin_proto::{record, Record, Value};

/// 8-byte records: two per 17-byte page, 504 per 4 KiB page.
fn pair_schema() -> Schema {
    Schema::new()
        .with_column("id", ColumnType::Int32)
        .with_column("tag", ColumnType::string(4))
}

fn int_schema(key: &str, other: &str) -> Schema {
    Schema::new()
        .with_column(key, ColumnType::Int32)
        .with_column(other, ColumnType::Int32)
}

fn ctx(work_mem: usize, page_size: usize) -> ExecutionContext {
    ExecutionContext::new(ExecutionConfig::new(work_mem).with_page_size(page_size))
}

fn scan(
    name: &str,
    schema: Schema,
    records: Vec<Record>,
    ctx: &ExecutionContext,
) -> Box<dyn QueryOperator> {
    Box::new(MemorySource::with_context(name, schema, records, ctx).unwrap())
}

fn run(op: &BnljOperator) -> Vec<Record> {
    let mut iter = op.join_iter().unwrap();
    collect_records(&mut iter).unwrap()
}

fn int_rows(records: &[Record]) -> Vec<Vec<i32>> {
    let mut rows: Vec<Vec<i32>> = records
        .iter()
        .map(|r| r.values().iter().map(|v| v.as_i32().unwrap()).collect())
        .collect();
    rows.sort();
    rows
}

/// Operator whose scan yields `records` up to `fail_at`, then errors.
struct FailingSource {
    schema: Schema,
    records: Vec<Record>,
    fail_at: usize,
}

struct FailingIter<'a> {
    source: &'a FailingSource,
    pos: usize,
}

impl RecordIterator for FailingIter<'_> {
    fn has_next(&mut self) -> Result<bool, Error> {
        if self.pos == self.source.fail_at {
            return Err(Error::Source("disk read failed".to_string()));
        }
        Ok(self.pos < self.source.records.len())
    }

    fn next_record(&mut self) -> Result<Record, Error> {
        if !self.has_next()? {
            return Err(Error::Exhausted);
        }
        self.pos += 1;
        Ok(self.source.records[self.pos - 1].clone())
    }
}

impl QueryOperator for FailingSource {
    fn name(&self) -> &str {
        "Failing"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn iter(&self) -> Result<Box<dyn RecordIterator + '_>, Error> {
        Ok(Box::new(FailingIter {
            source: self,
            pos: 0,
        }))
    }

    fn estimate_stats(&self) -> TableStats {
        TableStats::new(self.records.len() as u64, 2)
    }

    fn estimate_io_cost(&self) -> u64 {
        self.estimate_stats().num_pages()
    }
}

#[test]
fn test_no_matches() {
    let ctx = ctx(5, 4096);
    let op = BnljOperator::new(
        scan("l", pair_schema(), vec![record![1, "a"], record![2, "b"]], &ctx),
        scan("r", pair_schema(), vec![record![3, "x"]], &ctx),
        "id",
        "id",
        &ctx,
    )
    .unwrap();

    let mut iter = op.join_iter().unwrap();
    assert!(!iter.has_next().unwrap());
    assert!(matches!(iter.next_record(), Err(Error::Exhausted)));
}

#[test]
fn test_single_page_output_order() {
    let ctx = ctx(4, 4096);
    let left = vec![record![1, "a"], record![1, "b"], record![2, "c"]];
    let right = vec![record![1, "x"], record![3, "y"]];
    let op = BnljOperator::new(
        scan("l", pair_schema(), left, &ctx),
        scan("r", pair_schema(), right, &ctx),
        "id",
        "id",
        &ctx,
    )
    .unwrap();

    let out = run(&op);
    assert_eq!(out, vec![record![1, "a", 1, "x"], record![1, "b", 1, "x"]]);
}

#[test]
fn test_right_rescanned_once_per_left_block() {
    let ctx = ctx(4, 17);
    let schema = pair_schema();
    let rpp = records_per_page(17, &schema).unwrap();
    assert_eq!(rpp, 2);

    // left: 5 pages, right: 3 pages, 2 usable pages per block
    let left = (0..(5 * rpp) as i32).map(|i| record![i, "l"]).collect();
    let right = (0..(3 * rpp) as i32).map(|i| record![i, "r"]).collect();
    let op = BnljOperator::new(
        scan("l", schema.clone(), left, &ctx),
        scan("r", schema, right, &ctx),
        "id",
        "id",
        &ctx,
    )
    .unwrap();

    let out = run(&op);
    assert_eq!(out.len(), 3 * rpp);

    let snap = op.metrics().snapshot();
    assert_eq!(snap.left_blocks_fetched, 3);
    assert_eq!(snap.right_scans, 3);
    assert_eq!(snap.right_pages_fetched, 3 * 3);
    assert_eq!(snap.max_block_pages, 2);
    assert_eq!(snap.comparisons, (5 * rpp * 3 * rpp) as u64);
    assert_eq!(snap.records_emitted, out.len() as u64);
}

#[test]
fn test_block_never_exceeds_budget() {
    // 11 records, 6 pages
    let left: Vec<Record> = (0..11).map(|i| record![i, "l"]).collect();
    let right: Vec<Record> = (0..4).map(|i| record![i, "r"]).collect();

    for work_mem in 3..=8 {
        let ctx = ctx(work_mem, 17);
        let op = BnljOperator::new(
            scan("l", pair_schema(), left.clone(), &ctx),
            scan("r", pair_schema(), right.clone(), &ctx),
            "id",
            "id",
            &ctx,
        )
        .unwrap();

        let out = run(&op);
        assert_eq!(out.len(), 4, "work_mem = {}", work_mem);

        let usable = (work_mem - 2) as u64;
        let snap = op.metrics().snapshot();
        assert!(snap.max_block_pages <= usable, "work_mem = {}", work_mem);
        assert_eq!(snap.left_blocks_fetched, 6u64.div_ceil(usable));
        assert_eq!(snap.right_scans, snap.left_blocks_fetched);
    }
}

#[test]
fn test_matches_brute_force_nested_loop() {
    let left: Vec<Record> = (0..37).map(|i| record![i % 7, i]).collect();
    let right: Vec<Record> = (0..23).map(|i| record![i % 5, 100 + i]).collect();

    let mut expected = Vec::new();
    for l in &left {
        for r in &right {
            if l.get(0) == r.get(0) {
                expected.push(l.concat(r));
            }
        }
    }

    for (work_mem, page_size) in [(3, 17), (4, 33), (6, 64), (5, 4096)] {
        let ctx = ctx(work_mem, page_size);
        let op = BnljOperator::new(
            scan("l", int_schema("k", "v"), left.clone(), &ctx),
            scan("r", int_schema("k", "w"), right.clone(), &ctx),
            "k",
            "k",
            &ctx,
        )
        .unwrap();

        let out = run(&op);
        assert!(out.iter().all(|r| r.len() == op.schema().len()));
        assert_eq!(int_rows(&out), int_rows(&expected), "work_mem = {}", work_mem);
    }
}

#[test]
fn test_exhaustion_is_idempotent() {
    let ctx = ctx(3, 4096);
    let op = BnljOperator::new(
        scan("l", pair_schema(), vec![record![1, "a"]], &ctx),
        scan("r", pair_schema(), vec![record![1, "x"]], &ctx),
        "id",
        "id",
        &ctx,
    )
    .unwrap();

    let mut iter = op.join_iter().unwrap();
    assert!(iter.has_next().unwrap());
    assert!(iter.has_next().unwrap());
    iter.next_record().unwrap();

    for _ in 0..3 {
        assert!(!iter.has_next().unwrap());
        assert!(matches!(iter.next_record(), Err(Error::Exhausted)));
    }
    assert!(iter.next().is_none());
}

#[test]
fn test_each_scan_starts_over() {
    let ctx = ctx(3, 17);
    let left = (0..6).map(|i| record![i % 3, "l"]).collect();
    let right = (0..3).map(|i| record![i, "r"]).collect();
    let op = BnljOperator::new(
        scan("l", pair_schema(), left, &ctx),
        scan("r", pair_schema(), right, &ctx),
        "id",
        "id",
        &ctx,
    )
    .unwrap();

    let first = run(&op);
    let second = run(&op);
    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
}

#[test]
fn test_left_failure_aborts_join() {
    // one usable 2-record page per block; the left fails on its third pull
    let ctx = ctx(3, 17);
    let left = FailingSource {
        schema: pair_schema(),
        records: (1..=5).map(|i| record![i, "l"]).collect(),
        fail_at: 3,
    };
    let right = (1..=5).map(|i| record![i, "r"]).collect();
    let op = BnljOperator::new(
        Box::new(left),
        scan("r", pair_schema(), right, &ctx),
        "id",
        "id",
        &ctx,
    )
    .unwrap();

    let mut iter = op.join_iter().unwrap();
    let mut emitted = Vec::new();
    let err = loop {
        match iter.has_next() {
            Ok(true) => emitted.push(iter.next_record().unwrap()),
            Ok(false) => panic!("join finished despite a failing input"),
            Err(e) => break e,
        }
    };

    assert!(matches!(err, Error::Source(ref msg) if msg == "disk read failed"));
    assert_eq!(emitted, vec![record![1, "l", 1, "r"], record![2, "l", 2, "r"]]);

    assert!(matches!(iter.has_next(), Err(Error::Aborted)));
    assert!(matches!(iter.next_record(), Err(Error::Aborted)));
    assert!(iter.next().is_none());
}

#[test]
fn test_right_failure_fails_construction() {
    let ctx = ctx(3, 4096);
    let right = FailingSource {
        schema: pair_schema(),
        records: (0..10).map(|i| record![i, "r"]).collect(),
        fail_at: 4,
    };

    let result = BnljOperator::new(
        scan("l", pair_schema(), vec![record![1, "a"]], &ctx),
        Box::new(right),
        "id",
        "id",
        &ctx,
    );
    assert!(matches!(result, Err(Error::Source(_))));
}

#[test]
fn test_unknown_and_incomparable_columns() {
    let ctx = ctx(3, 4096);
    let missing = BnljOperator::new(
        scan("l", pair_schema(), vec![], &ctx),
        scan("r", pair_schema(), vec![], &ctx),
        "nope",
        "id",
        &ctx,
    );
    assert!(matches!(missing, Err(Error::ColumnNotFound { .. })));

    let incomparable = BnljOperator::new(
        scan("l", pair_schema(), vec![], &ctx),
        scan("r", pair_schema(), vec![], &ctx),
        "id",
        "tag",
        &ctx,
    );
    assert!(matches!(
        incomparable,
        Err(Error::IncomparableColumns { .. })
    ));
}

#[test]
fn test_null_keys() {
    let schema = Schema::new()
        .with_nullable_column("k", ColumnType::Int32)
        .with_column("v", ColumnType::Int32);
    let left = vec![record![Value::Null, 1], record![1, 2]];
    let right = vec![record![Value::Null, 10], record![1, 20]];

    let distinct = ctx(3, 4096);
    let op = BnljOperator::new(
        scan("l", schema.clone(), left.clone(), &distinct),
        scan("r", schema.clone(), right.clone(), &distinct),
        "k",
        "k",
        &distinct,
    )
    .unwrap();
    assert_eq!(run(&op), vec![record![1, 2, 1, 20]]);

    let matching = ExecutionContext::new(
        ExecutionConfig::new(3).with_null_equality(NullEquality::Match),
    );
    let op = BnljOperator::new(
        scan("l", schema.clone(), left, &matching),
        scan("r", schema, right, &matching),
        "k",
        "k",
        &matching,
    )
    .unwrap();
    assert_eq!(
        run(&op),
        vec![
            record![Value::Null, 1, Value::Null, 10],
            record![1, 2, 1, 20],
        ]
    );
}

#[test]
fn test_mixed_width_numeric_keys() {
    let ctx = ctx(3, 4096);
    let left_schema = Schema::new().with_column("k", ColumnType::Int32);
    let right_schema = Schema::new().with_column("k", ColumnType::Int64);
    let op = BnljOperator::new(
        scan("l", left_schema, vec![record![7], record![8]], &ctx),
        scan("r", right_schema, vec![record![7i64]], &ctx),
        "k",
        "k",
        &ctx,
    )
    .unwrap();
    assert_eq!(run(&op), vec![record![7, 7i64]]);
}

fn users(ctx: &ExecutionContext) -> Box<dyn QueryOperator> {
    let rows = (1..=4).map(|i| record![i, i * 10]).collect();
    scan("users", int_schema("id", "age").qualified("users"), rows, ctx)
}

fn posts(ctx: &ExecutionContext) -> Box<dyn QueryOperator> {
    // post i belongs to user (i % 4) + 1
    let rows = (0..8).map(|i| record![i, (i % 4) + 1]).collect();
    scan("posts", int_schema("id", "user_id").qualified("posts"), rows, ctx)
}

fn comments(ctx: &ExecutionContext) -> Box<dyn QueryOperator> {
    // two comments on each even post
    let rows = (0..8).map(|i| record![100 + i, (i / 2) * 2]).collect();
    scan(
        "comments",
        int_schema("id", "post_id").qualified("comments"),
        rows,
        ctx,
    )
}

#[test]
fn test_nested_join_as_left_input() {
    let ctx = ctx(3, 4096);
    let user_posts = BnljOperator::new(users(&ctx), posts(&ctx), "users.id", "user_id", &ctx)
        .unwrap();
    let op = BnljOperator::new(
        Box::new(user_posts),
        comments(&ctx),
        "posts.id",
        "post_id",
        &ctx,
    )
    .unwrap();

    let out = run(&op);
    assert_eq!(op.schema().len(), 6);
    assert_eq!(out.len(), 8);
    for r in &out {
        // users.id = posts.user_id and posts.id = comments.post_id
        assert_eq!(r.get(0), r.get(3));
        assert_eq!(r.get(2), r.get(5));
    }
}

#[test]
fn test_nested_join_as_right_input() {
    let ctx = ctx(3, 4096);
    let post_comments =
        BnljOperator::new(posts(&ctx), comments(&ctx), "posts.id", "post_id", &ctx).unwrap();
    let op = BnljOperator::new(
        users(&ctx),
        Box::new(post_comments),
        "users.id",
        "user_id",
        &ctx,
    )
    .unwrap();

    let out = run(&op);
    assert_eq!(out.len(), 8);
    assert_eq!(op.right().len(), 8);
    assert!(out.iter().all(|r| r.get(0) == r.get(3)));
}

#[test]
fn test_ambiguous_column_in_nested_join() {
    let ctx = ctx(3, 4096);
    let user_posts = BnljOperator::new(users(&ctx), posts(&ctx), "users.id", "user_id", &ctx)
        .unwrap();
    let result = BnljOperator::new(
        Box::new(user_posts),
        comments(&ctx),
        "id",
        "post_id",
        &ctx,
    );
    assert!(matches!(result, Err(Error::AmbiguousColumn { .. })));
}

#[test]
fn test_cost_formula() {
    assert_eq!(estimate_bnlj_io_cost(10, 3, 5, 10), 30);

    let ctx = ctx(5, 17);
    let left = (0..20).map(|i| record![i, "l"]).collect();
    let right = (0..10).map(|i| record![i, "r"]).collect();
    let op = BnljOperator::new(
        scan("l", pair_schema(), left, &ctx),
        scan("r", pair_schema(), right, &ctx),
        "id",
        "id",
        &ctx,
    )
    .unwrap();

    // left 10 pages, 3 usable -> 4 blocks, right 5 pages
    assert_eq!(op.estimate_io_cost(), 4 * 5 + 10);
    assert_eq!(op.estimate_cost().cpu_cost, 200);
}

#[test]
fn test_explain_lists_inputs() {
    let ctx = ctx(5, 4096);
    let op = BnljOperator::new(users(&ctx), posts(&ctx), "users.id", "user_id", &ctx).unwrap();
    let text = explain(&op);

    assert!(text.starts_with("-> BNLJ on users.id = user_id (buffers: 5)"));
    assert!(text.contains("   -> Scan users"));
    assert!(text.contains("      -> Scan posts"));
}
