use alpaca_core::{get_class_map, get_state_membership, Node};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A chain of `depth` classes, each inheriting from the previous, with one
/// state per class.
fn layered(depth: usize) -> Node {
    let names: Vec<String> = (0..depth).map(|i| format!("c{}", i)).collect();
    let mut defns = Vec::new();
    for i in 0..depth {
        let parents: Vec<&str> = if i == 0 { vec![] } else { vec![names[i - 1].as_str()] };
        defns.push(Node::class_defn(&names[i], &parents));
    }
    for i in 0..depth {
        let glyph = char::from_u32(0x41 + i as u32).unwrap_or('?');
        defns.push(Node::state_defn(&format!("s{}", i), glyph, &[names[i].as_str()]));
    }
    Node::alpaca(Node::defns(defns), Node::playfield(None))
}

fn bench_membership(c: &mut Criterion) {
    let ast = layered(24);
    c.bench_function("state_membership_deepest", |b| {
        b.iter(|| get_state_membership(black_box(&ast), "s23").unwrap())
    });
    c.bench_function("class_map_24", |b| {
        b.iter(|| get_class_map(black_box(&ast)).unwrap())
    });
}

criterion_group!(benches, bench_membership);
criterion_main!(benches);
