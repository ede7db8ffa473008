use divan::{black_box, Bencher};
use statefuzz::{Config, TemplateBuilder};

#[divan::bench]
fn fill_default(bencher: Bencher) {
    let mut template = TemplateBuilder::new(Config::default())
        .seed(0)
        .build()
        .unwrap();
    bencher.bench_local(|| black_box(template.fill()));
}

#[divan::bench]
fn fill_with_argument_pass(bencher: Bencher) {
    let mut config = Config::default();
    config.prestate.arguments.enabled = true;
    config.prestate.storage_slots.max = 8;
    let mut template = TemplateBuilder::new(config).seed(0).build().unwrap();
    bencher.bench_local(|| black_box(template.fill()));
}

#[divan::bench]
fn fill_json(bencher: Bencher) {
    let mut template = TemplateBuilder::new(Config::default())
        .seed(0)
        .build()
        .unwrap();
    bencher.bench_local(|| black_box(template.fill_json().unwrap()));
}

fn main() {
    divan::main();
}
