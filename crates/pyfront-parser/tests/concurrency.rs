// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parsers share no state, so independent parses may run on many threads.

use pyfront_parser::{parse_module, Mod};
use rayon::prelude::*;

fn source(i: usize) -> String {
    format!(
        "def f{i}(a, b={i}):\n    return [x * {i} for x in range(a) if x != b]\n\n\
         class C{i}:\n    value = f{i}(1)\n"
    )
}

#[test]
fn parallel_parses_match_serial_parses() {
    let sources: Vec<String> = (0..64).map(source).collect();

    let serial: Vec<Mod> = sources
        .iter()
        .map(|s| parse_module(s, None).expect("parse").root)
        .collect();
    let parallel: Vec<Mod> = sources
        .par_iter()
        .map(|s| parse_module(s, None).expect("parse").root)
        .collect();

    assert_eq!(serial, parallel);
}

#[test]
fn parallel_errors_are_independent() {
    let results: Vec<bool> = (0..64)
        .into_par_iter()
        .map(|i| {
            let text = if i % 2 == 0 {
                source(i)
            } else {
                format!("def f{i}(:\n")
            };
            parse_module(&text, None).is_ok()
        })
        .collect();

    for (i, ok) in results.iter().enumerate() {
        assert_eq!(*ok, i % 2 == 0, "source {i}");
    }
}

#[test]
fn deep_nesting_on_worker_threads() {
    let parens = format!("x = {}a{}\n", "(".repeat(200), ")".repeat(200));
    let lists = format!("y = {}1{}\n", "[".repeat(120), "]".repeat(120));
    let ok: Vec<bool> = (0..8)
        .into_par_iter()
        .map(|i| {
            let text = if i % 2 == 0 { &parens } else { &lists };
            parse_module(text, None).is_ok()
        })
        .collect();
    assert!(ok.iter().all(|&ok| ok), "{ok:?}");
}
