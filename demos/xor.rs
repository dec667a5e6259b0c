//! XOR classification example.

use granular_tsetlin::{Machine, MachineArgs, TrainOptions};

fn main() {
    let args = MachineArgs::builder()
        .inputs(2)
        .outputs(2)
        .clauses(10)
        .threshold(4)
        .specificity(4.0, 4.0)
        .tier_tags(["xor=0", "xor=1"])
        .build()
        .expect("valid arguments");

    let mut tm = Machine::with_seed(args, 42);

    let x = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
    let y = vec![vec![1, 0], vec![0, 1], vec![0, 1], vec![1, 0]];

    tm.load(&x, &y).expect("well-formed dataset");

    println!("Training on XOR dataset...");
    let report = tm.train_with_options(
        TrainOptions::new(2000)
            .with_early_stop(200, 0.0)
            .with_callback(|epoch, acc| {
                if epoch % 100 == 0 {
                    println!("  epoch {epoch:4}: {:.1}%", acc * 100.0);
                }
                true
            })
    );
    println!(
        "Stopped after {} epochs (early: {})",
        report.epochs_run, report.stopped_early
    );

    println!("\nPredictions:");
    let predictions = tm.load_and_predict(&x).expect("well-formed input");
    for ((xi, yi), pred) in x.iter().zip(&y).zip(&predictions) {
        let status = if pred == yi { "OK" } else { "WRONG" };
        println!("  {xi:?} -> {pred:?} (expected: {yi:?}) {status}");
    }

    println!(
        "\nAccuracy: {:.1}%",
        tm.accuracy(&x, &y).expect("well-formed dataset") * 100.0
    );

    println!("\nLearned patterns:");
    for report in tm.patterns() {
        print!("{report}");
    }
}
