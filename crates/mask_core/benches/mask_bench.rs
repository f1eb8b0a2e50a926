use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use mask_core::{FormatDefinition, FormatPreset, KeyEvent, MaskParser, StringHost};

const DATE_KEYS: [&str; 8] = ["2", "4", "1", "2", "2", "0", "2", "4"];
const EDIT_ROUNDS: usize = 256;

fn attached(def: FormatDefinition) -> MaskParser<StringHost> {
    let mut mask = MaskParser::new(def);
    let mut host = StringHost::new();
    host.set_focused(true);
    mask.attach_host(host);
    mask
}

fn bench_type_full_date(c: &mut Criterion) {
    let keys: Vec<KeyEvent> = DATE_KEYS.iter().map(|k| KeyEvent::new(*k)).collect();
    c.bench_function("bench_type_full_date", |b| {
        b.iter_batched(
            || attached(FormatPreset::DayMonthYear.definition()),
            |mut mask| {
                for key in &keys {
                    black_box(mask.on_key_down(key));
                }
                black_box(mask.value());
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_edit_churn_range(c: &mut Criterion) {
    let def = FormatPreset::DayMonthYear
        .definition()
        .range(" - ")
        .with_delete_shift(true);
    let type_keys: Vec<KeyEvent> = DATE_KEYS.iter().map(|k| KeyEvent::new(*k)).collect();
    let backspace = KeyEvent::new("Backspace");
    let home = KeyEvent::new("Home");
    let delete = KeyEvent::new("Delete");
    c.bench_function("bench_edit_churn_range", |b| {
        b.iter_batched(
            || attached(def.clone()),
            |mut mask| {
                for _ in 0..EDIT_ROUNDS {
                    for key in &type_keys {
                        mask.on_key_down(key);
                    }
                    mask.on_key_down(&home);
                    mask.on_key_down(&delete);
                    mask.on_key_down(&backspace);
                }
                black_box(mask.render());
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_load_value(c: &mut Criterion) {
    let mut mask = attached(FormatPreset::Hour12.definition());
    c.bench_function("bench_load_value", |b| {
        b.iter(|| {
            mask.load_value(black_box("11:45 pm"));
            mask.load_value(black_box(""));
        });
    });
}

criterion_group!(
    benches,
    bench_type_full_date,
    bench_edit_churn_range,
    bench_load_value
);
criterion_main!(benches);
