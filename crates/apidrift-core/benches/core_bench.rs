//! Criterion benchmarks for apidrift-core.
//!
//! ## Benchmark groups
//!
//! 1. **type_parsing**: docstring type text to structured types.
//! 2. **similarity**: pairwise blended scores.
//! 3. **mapper**: component mapping over synthetic class sets.
//! 4. **pipeline**: all four differ stages plus migration.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/apidrift-core/Cargo.toml
//! # Run only the pipeline group:
//! cargo bench --manifest-path crates/apidrift-core/Cargo.toml -- pipeline
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// The lib target is called `_apidrift_core` (matching the Python extension
// module name).
use _apidrift_core::config::{DifferConfig, MigrationConfig};
use _apidrift_core::differ::mapper::Mapper;
use _apidrift_core::differ::pipeline::run_pipeline;
use _apidrift_core::differ::similarity::SimilarityEngine;
use _apidrift_core::differ::NaiveDiffer;
use _apidrift_core::docstring::parse_type;
use _apidrift_core::migration::migrate;
use _apidrift_core::model::annotations::{Annotation, AnnotationHeader};
use _apidrift_core::model::api::{Api, Class, Function, Parameter, ParameterDocumentation};
use _apidrift_core::store::AnnotationStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Synthetic snapshot with `classes` classes of three methods each, every
/// method taking two documented parameters. `version` perturbs names and
/// docs so the two snapshots are similar but not identical.
fn synthetic_api(classes: usize, version: usize) -> Api {
    let mut api = Api::new("bench", "bench", &version.to_string());
    for c in 0..classes {
        let class_name = if version > 1 && c % 5 == 0 {
            format!("Estimator{c}V{version}")
        } else {
            format!("Estimator{c}")
        };
        let class_id = format!("bench/bench/{class_name}");
        let mut methods = Vec::new();
        for m in ["fit", "predict", "score"] {
            let method_id = format!("{class_id}/{m}");
            let params: Vec<String> = ["alpha", "solver"]
                .iter()
                .map(|p| format!("{method_id}/{p}"))
                .collect();
            for (i, param_id) in params.iter().enumerate() {
                let (type_text, description) = if i == 0 {
                    ("float, default=1.0", "Strength in the range (0, inf).")
                } else {
                    ("{'auto', 'lbfgs', 'sag'}", "Solver to use.")
                };
                api.add_parameter(Parameter {
                    id: param_id.clone(),
                    qname: param_id.replace('/', "."),
                    default_value: Some("None".into()),
                    is_public: true,
                    docstring: ParameterDocumentation {
                        type_text: type_text.into(),
                        default_value: String::new(),
                        description: description.into(),
                    },
                    ..Parameter::default()
                });
            }
            api.add_function(Function {
                id: method_id.clone(),
                qname: format!("bench.{class_name}.{m}"),
                parameters: params,
                is_public: true,
                description: format!("Run {m} on estimator {c} (revision {version})"),
                code: format!("def {m}(self, alpha=1.0, solver='auto'):\n    return {c}"),
                ..Function::default()
            });
            methods.push(method_id);
        }
        api.add_class(Class {
            id: class_id,
            qname: format!("bench.{class_name}"),
            methods,
            is_public: true,
            description: format!("Estimator number {c}"),
            code: format!("class {class_name}:\n    n = {c}"),
            ..Class::default()
        });
    }
    api
}

// ---------------------------------------------------------------------------
// 1. Type parsing
// ---------------------------------------------------------------------------

fn bench_type_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("type_parsing");
    let inputs = [
        ("named", "int", ""),
        ("union", "int, str or None, default=None", ""),
        ("enum", "{'auto', 'full', 'arpack', 'randomized'}, default='auto'", ""),
        ("boundary", "float", "Tolerance, must be in the range [0.0, infinity)."),
    ];
    for (name, type_text, description) in inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(type_text, description), |b, (t, d)| {
            b.iter(|| parse_type(black_box(t), black_box(d)))
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Similarity
// ---------------------------------------------------------------------------

fn bench_similarity(c: &mut Criterion) {
    let old = synthetic_api(10, 1);
    let new = synthetic_api(10, 2);
    let engine = SimilarityEngine::default();
    let x = &old.classes["bench/bench/Estimator0"];
    let y = &new.classes["bench/bench/Estimator0V2"];
    let f = &old.functions["bench/bench/Estimator1/fit"];
    let g = &new.functions["bench/bench/Estimator1/fit"];

    let mut group = c.benchmark_group("similarity");
    group.bench_function("class", |b| {
        b.iter(|| engine.class_similarity(&old, black_box(x), &new, black_box(y)))
    });
    group.bench_function("function", |b| {
        b.iter(|| engine.function_similarity(&old, black_box(f), &new, black_box(g)))
    });
    group.finish();
}

// ---------------------------------------------------------------------------
// 3. Mapper
// ---------------------------------------------------------------------------

fn bench_mapper(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapper");
    for size in [10usize, 40] {
        let old = synthetic_api(size, 1);
        let new = synthetic_api(size, 2);
        group.bench_with_input(BenchmarkId::new("naive", size), &size, |b, _| {
            b.iter(|| {
                let differ = NaiveDiffer::new(&old, &new);
                Mapper::new(0.6).map_api(&old, &new, &differ)
            })
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 4. Pipeline
// ---------------------------------------------------------------------------

fn bench_pipeline(c: &mut Criterion) {
    let old = synthetic_api(20, 1);
    let new = synthetic_api(20, 2);
    let config = DifferConfig::default();
    let annotations: AnnotationStore = old
        .functions
        .keys()
        .map(|id| Annotation::Todo {
            header: AnnotationHeader::new(id.as_str(), "bench"),
            new_todo: "review".into(),
        })
        .collect();

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.bench_function("diff", |b| b.iter(|| run_pipeline(black_box(&old), black_box(&new), &config)));
    group.bench_function("diff_and_migrate", |b| {
        b.iter(|| {
            run_pipeline(&old, &new, &config)
                .and_then(|outcome| migrate(&annotations, &outcome.mapping, &new, &MigrationConfig::default()))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_type_parsing,
    bench_similarity,
    bench_mapper,
    bench_pipeline
);
criterion_main!(benches);
