//! Integration tests for the multigranular Tsetlin Machine.

use granular_tsetlin::{
    Dataset, Error, Hyperparameters, Machine, MachineArgs, MachineModel, TrainOptions,
    evaluate_candidate, nucleotide, one_hot,
    utils::{FastRng, rng_from_seed}
};
use rand::Rng;

fn xor() -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let x = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
    let y = vec![vec![1, 0], vec![0, 1], vec![0, 1], vec![1, 0]];
    (x, y)
}

fn xor_args() -> MachineArgs {
    MachineArgs::builder()
        .inputs(2)
        .outputs(2)
        .clauses(10)
        .threshold(4)
        .specificity(4.0, 4.0)
        .dropout(0.0)
        .build()
        .unwrap()
}

/// Random 0/1 rows whose class is bit 17, which lives in the second block.
fn second_block_data(rng: &mut FastRng, n: usize) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let x: Vec<Vec<u8>> = (0..n)
        .map(|_| (0..20).map(|_| rng.random_range(0..=1u8)).collect())
        .collect();
    let y = x.iter().map(|row| one_hot(usize::from(row[17]), 2)).collect();
    (x, y)
}

/// Class `c` sets bit `c` of the first three; the remaining bits are noise.
fn three_class_data(rng: &mut FastRng, n: usize) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for _ in 0..n {
        let class = rng.random_range(0..3usize);
        let mut row: Vec<u8> = (0..8).map(|_| rng.random_range(0..=1u8)).collect();
        row[..3].fill(0);
        row[class] = 1;
        x.push(row);
        y.push(one_hot(class, 3));
    }
    (x, y)
}

#[test]
fn xor_reaches_full_accuracy() {
    let (x, y) = xor();
    let mut tm = Machine::with_seed(xor_args(), 2024);
    tm.load(&x, &y).unwrap();
    tm.train(3000);

    assert_eq!(tm.load_and_predict(&x).unwrap(), y);
}

#[test]
fn fresh_machine_predicts_class_zero() {
    let (x, _) = xor();
    let tm = Machine::with_seed(xor_args(), 1);

    for row in tm.confidences(&x).unwrap() {
        assert_eq!(row, vec![0.0, 0.0]);
    }
    assert_eq!(tm.predict_classes(&x).unwrap(), vec![0; 4]);
}

#[test]
fn learns_feature_past_block_boundary() {
    let mut rng = rng_from_seed(77);
    let (x, y) = second_block_data(&mut rng, 40);
    let (x_test, y_test) = second_block_data(&mut rng, 100);

    let args = MachineArgs::builder()
        .inputs(20)
        .outputs(2)
        .clauses(10)
        .threshold(4)
        .build()
        .unwrap();
    let mut tm = Machine::with_seed(args, 3);
    tm.load(&x, &y).unwrap();
    tm.train(200);

    assert!(tm.accuracy(&x_test, &y_test).unwrap() >= 0.75);
}

#[test]
fn multigranular_three_classes() {
    let mut rng = rng_from_seed(5);
    let (x, y) = three_class_data(&mut rng, 60);
    let (x_test, y_test) = three_class_data(&mut rng, 100);

    let args = MachineArgs::builder()
        .inputs(8)
        .outputs(3)
        .clauses(12)
        .threshold(6)
        .specificity(2.0, 8.0)
        .tier_tags(["first", "second", "third"])
        .build()
        .unwrap();
    let mut tm = Machine::with_seed(args, 11);
    tm.load(&x, &y).unwrap();

    let report = tm.train_with_options(TrainOptions::new(300));
    assert_eq!(report.epochs_run, 300);
    assert!(tm.accuracy(&x_test, &y_test).unwrap() >= 0.75);

    let patterns = tm.patterns();
    assert_eq!(patterns.len(), 3);
    assert_eq!(patterns[2].tag, "third");
}

#[test]
fn dropout_still_learns() {
    let (x, y) = xor();
    let args = MachineArgs {
        dropout_ratio: 0.2,
        ..xor_args()
    };
    let mut tm = Machine::with_seed(args, 8);
    tm.load(&x, &y).unwrap();
    tm.train(3000);

    assert!(tm.accuracy(&x, &y).unwrap() >= 0.75);
}

#[test]
fn shape_errors_leave_machine_untouched() {
    let (x, y) = xor();
    let mut tm = Machine::with_seed(xor_args(), 1);
    tm.load(&x, &y).unwrap();

    let err = tm.load(&[vec![1, 0, 1]], &[vec![1, 0]]).unwrap_err();
    assert!(err.is_shape_error());
    assert_eq!(tm.sample_count(), 4);

    let err = tm.load_and_predict(&[vec![1, 0], vec![1]]).unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            row:      1,
            expected: 2,
            got:      1
        }
    ));
}

#[test]
fn export_import_preserves_predictions() {
    let (x, y) = xor();
    let mut trained = Machine::with_seed(xor_args(), 21);
    trained.load(&x, &y).unwrap();
    trained.train(300);

    let model = trained.export_model();
    let mut restored = Machine::new(xor_args());
    restored.import_model(&model).unwrap();

    assert_eq!(restored.export_model(), model);
    assert_eq!(
        restored.confidences(&x).unwrap(),
        trained.confidences(&x).unwrap()
    );
}

#[test]
fn same_seed_same_training() {
    let (x, y) = xor();
    let run = |seed| {
        let mut tm = Machine::with_seed(xor_args(), seed);
        tm.load(&x, &y).unwrap();
        tm.train(40);
        tm.export_model()
    };

    assert_eq!(run(13), run(13));
    assert_ne!(run(13), run(14));
}

#[cfg(feature = "serde")]
#[test]
fn model_file_round_trip() {
    let (x, y) = xor();
    let mut tm = Machine::with_seed(xor_args(), 4);
    tm.load(&x, &y).unwrap();
    tm.train(100);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("xor.model");
    tm.export_model().save(&path).unwrap();

    let model = MachineModel::load(&path).unwrap();
    let mut restored = Machine::with_seed(xor_args(), 0);
    restored.import_model(&model).unwrap();
    assert_eq!(
        restored.load_and_predict(&x).unwrap(),
        tm.load_and_predict(&x).unwrap()
    );

    let json = model.to_json().unwrap();
    assert_eq!(MachineModel::from_json(&json).unwrap(), model);
}

#[test]
fn candidate_evaluation_on_split() {
    let mut rng = rng_from_seed(31);
    let (x, y) = second_block_data(&mut rng, 120);
    let dataset = Dataset::split(x, y, 0.7, &mut rng).unwrap();

    let base = MachineArgs::builder()
        .inputs(20)
        .outputs(2)
        .clauses(1)
        .build()
        .unwrap();
    let candidate = Hyperparameters {
        clause_per_output: 10,
        threshold:         4
    };
    let fitness = evaluate_candidate(&base, candidate, &dataset, 100, 2).unwrap();

    assert!(fitness.value >= 0.75);
    assert_eq!(fitness.model.args.input_size, 20);
}

#[test]
fn nucleotide_pipeline() {
    let sequences = ["ACGU", "GGCA", "UUAC", "CCGG"];
    let data = nucleotide::encode_batch(&sequences).unwrap();
    let gc: Vec<f64> = sequences.iter().map(|s| nucleotide::gc_content(s)).collect();

    let dataset = Dataset::from_values(data, &gc, 2, 1.0, &mut rng_from_seed(0)).unwrap();
    assert_eq!(dataset.train_size(), 4);
    assert_eq!(dataset.train_data[0].len(), 16);
    assert_eq!(dataset.response_thresholds, vec![0.75]);
    assert_eq!(dataset.train_response[3], vec![0, 1]);
    assert_eq!(dataset.train_response[2], vec![1, 0]);
}

#[test]
fn sequence_features_feed_the_machine() {
    let sequences = ["ACGU", "GGCA", "UUAC", "CCGG", "AAAA", "GCGC"];
    let gc: Vec<f64> = sequences.iter().map(|s| nucleotide::gc_content(s)).collect();
    let (data, cuts) = nucleotide::encode_with_features(&sequences, &[gc], 3).unwrap();

    assert_eq!(cuts[0].len(), 2);
    assert!(data.iter().all(|row| row.len() == 4 * 4 + 3));

    let response: Vec<Vec<u8>> = data
        .iter()
        .map(|row| one_hot(usize::from(row[16] == 0), 2))
        .collect();
    let args = MachineArgs::builder()
        .inputs(19)
        .outputs(2)
        .clauses(4)
        .tier_tags(["low", "high"])
        .build()
        .unwrap();
    let mut tm = Machine::with_seed(args, 9);
    tm.load(&data, &response).unwrap();
    tm.train(50);

    let stats = nucleotide::word_stats(&tm.export_model(), 4);
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[1].tag, "high");
    assert_eq!(stats[0].positive.mean_weight.len(), 8);
    assert_eq!(stats[0].positive.mean_weight[0].len(), 4);
    for s in &stats {
        for &rate in s.positive.inclusion_rate.iter().chain(&s.negative.inclusion_rate).flatten() {
            assert!((-1e-9..=1.0 + 1e-9).contains(&rate));
        }
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_training_equals_sequential() {
    let mut rng = rng_from_seed(12);
    let (x, y) = three_class_data(&mut rng, 30);
    let args = MachineArgs::builder()
        .inputs(8)
        .outputs(3)
        .clauses(6)
        .build()
        .unwrap();

    let mut seq = Machine::with_seed(args.clone(), 6);
    let mut par = Machine::with_seed(args, 6);
    seq.load(&x, &y).unwrap();
    par.load(&x, &y).unwrap();
    seq.train(25);
    par.train_parallel(25);

    assert_eq!(seq.export_model(), par.export_model());
}
