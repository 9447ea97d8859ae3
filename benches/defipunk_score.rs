use alloy::primitives::{address, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use defipunk::{
    models::Protocol,
    services::{calculate_alignment_score, filter_and_sort_protocols},
    subgraphs::aave_v3::{self, IPool},
};

fn sample_protocols(count: usize) -> Vec<Protocol> {
    let slugs = ["uniswap", "aave", "compound", "curve", "makerdao", "tornado-cash", "lido"];
    (0..count)
        .map(|i| {
            let slug = slugs[i % slugs.len()];
            Protocol {
                id: i.to_string(),
                name: format!("{} {}", slug, i),
                slug: slug.to_string(),
                category: if i % 10 == 0 { "CEX" } else { "Lending" }.to_string(),
                tvl: (i as f64) * 250_000.0,
                ..Default::default()
            }
        })
        .collect()
}

fn benchmark_scoring(c: &mut Criterion) {
    c.bench_function("alignment_score_known", |b| {
        b.iter(|| calculate_alignment_score(black_box("Tornado-Cash")))
    });

    c.bench_function("alignment_score_default", |b| {
        b.iter(|| calculate_alignment_score(black_box("some-new-protocol")))
    });

    let protocols = sample_protocols(3_000);
    c.bench_function("filter_and_sort_3000", |b| {
        b.iter(|| filter_and_sort_protocols(black_box(&protocols)))
    });
}

fn benchmark_mapping(c: &mut Criterion) {
    let subgraph = aave_v3::subgraph();
    let event = IPool::Supply {
        reserve: address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
        user: address!("00000000000000000000000000000000000a11ce"),
        onBehalfOf: address!("00000000000000000000000000000000000a11ce"),
        amount: U256::from(1_000_000u64),
        referralCode: 0,
    };
    let log = Log {
        inner: alloy::primitives::Log { address: aave_v3::POOL, data: event.encode_log_data() },
        block_hash: Some(B256::ZERO),
        block_number: Some(1),
        block_timestamp: Some(1),
        transaction_hash: Some(B256::repeat_byte(1)),
        transaction_index: Some(0),
        log_index: Some(0),
        removed: false,
    };

    c.bench_function("map_aave_supply", |b| b.iter(|| subgraph.process_log(black_box(&log))));
}

criterion_group!(benches, benchmark_scoring, benchmark_mapping);
criterion_main!(benches);
