use proptest::prelude::*;
use sentiment_bench::{
    datasets::Sentiment,
    metrics::{classification_report, evaluate},
};

fn labels(len: usize) -> impl Strategy<Value = Vec<Sentiment>> {
    prop::collection::vec(
        prop::sample::select(Sentiment::ALL.to_vec()),
        len,
    )
}

fn label_pairs() -> impl Strategy<Value = (Vec<Sentiment>, Vec<Sentiment>)> {
    (0usize..200).prop_flat_map(|len| (labels(len), labels(len)))
}

proptest! {
    #[test]
    fn prop_confusion_matrix_counts_every_example((y_true, y_pred) in label_pairs()) {
        let metrics = evaluate(&y_true, &y_pred).unwrap();

        prop_assert_eq!(metrics.confusion_matrix.total(), y_true.len());

        for label in Sentiment::ALL {
            let support = y_true.iter().filter(|&&l| l == label).count();
            prop_assert_eq!(metrics.support(label), support);
        }
    }

    #[test]
    fn prop_metrics_stay_in_unit_range((y_true, y_pred) in label_pairs()) {
        let metrics = evaluate(&y_true, &y_pred).unwrap();

        let scores = [
            metrics.accuracy,
            metrics.weighted_f1,
            metrics.macro_avg.f1,
            metrics.weighted_avg.f1,
        ]
        .into_iter()
        .chain(metrics.per_class.precision)
        .chain(metrics.per_class.recall)
        .chain(metrics.per_class.f1);

        for score in scores {
            prop_assert!((0.0..=1.0).contains(&score), "score out of range: {}", score);
        }
    }

    #[test]
    fn prop_evaluation_is_deterministic((y_true, y_pred) in label_pairs()) {
        let first = evaluate(&y_true, &y_pred).unwrap();
        let second = evaluate(&y_true, &y_pred).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(classification_report(&first), classification_report(&second));
    }

    #[test]
    fn prop_perfect_predictions_score_one(y_true in labels(50)) {
        let metrics = evaluate(&y_true, &y_true).unwrap();

        prop_assert_eq!(metrics.accuracy, 1.0);
        prop_assert!((metrics.weighted_f1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn prop_mismatched_lengths_are_rejected(y_true in labels(5), y_pred in labels(4)) {
        prop_assert!(evaluate(&y_true, &y_pred).is_err());
    }
}
