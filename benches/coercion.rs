use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use seqshape::{
    resolve, ElementType, FeatureFlag, GlobalFeatureState, ObjectMapper, PropertyDescriptor,
    PropertyFeatureOverride, Record, Sequence, TypeSchema,
};

const UNWRAP: FeatureFlag = FeatureFlag::UnwrapSingleElementSequences;
const ACCEPT: FeatureFlag = FeatureFlag::AcceptSingleValueAsSequence;

fn schema() -> Arc<TypeSchema> {
    let role = TypeSchema::builder("Role")
        .property(PropertyDescriptor::scalar("ID", ElementType::String))
        .property(PropertyDescriptor::scalar("Name", ElementType::String))
        .build()
        .unwrap();

    TypeSchema::builder("Bench")
        .property(PropertyDescriptor::list("single", ElementType::String).with(UNWRAP))
        .property(PropertyDescriptor::list("many", ElementType::Int))
        .property(PropertyDescriptor::array("roles", ElementType::Record(role)).with(ACCEPT))
        .build()
        .unwrap()
}

fn bench_resolve(c: &mut Criterion) {
    let global = GlobalFeatureState::new().with(UNWRAP);
    let overrides = PropertyFeatureOverride::NONE.force_off(UNWRAP).force_on(ACCEPT);

    c.bench_function("resolve/forced_off", |b| {
        b.iter(|| resolve(black_box(UNWRAP), black_box(&global), black_box(&overrides)));
    });
}

fn bench_write(c: &mut Criterion) {
    let schema = schema();
    let record = Record::new(schema)
        .with("single", Sequence::list(["a"]))
        .unwrap()
        .with("many", Sequence::list(0..256))
        .unwrap();
    let writer = ObjectMapper::new().writer();

    let mut group = c.benchmark_group("write");
    group.throughput(Throughput::Elements(257));
    group.bench_function("record", |b| {
        b.iter(|| writer.write_value(black_box(&record)).unwrap());
    });
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let reader = ObjectMapper::new().reader(schema());
    let json = serde_json::json!({
        "single": ["a"],
        "many": (0..256).collect::<Vec<i64>>(),
        "roles": {"ID": "333", "Name": "User"},
    });

    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Elements(258));
    group.bench_function("record", |b| {
        b.iter(|| reader.read_json(black_box(&json)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_write, bench_read);
criterion_main!(benches);
