use std::cell::RefCell;
use std::rc::Rc;

use ndarray::{arr1, Array1};
use rand::rngs::StdRng;
use rand::SeedableRng;

use backprop_nn::prelude::*;

const BLOCK: usize = 78;

/// Class `c` lights the pixel block `[c * 78, c * 78 + 78)`
fn block_image(label: usize) -> Vec<Float> {
    let mut pixels = vec![0.0; 784];
    for p in pixels[label * BLOCK..(label + 1) * BLOCK].iter_mut() {
        *p = 1.0;
    }
    pixels
}

fn block_loader(per_class: usize) -> SimpleDataLoader {
    SimpleDataLoader::new(
        (0..per_class * 10)
            .map(|i| Example::new(block_image(i % 10), i % 10))
            .collect(),
    )
}

fn digits_net(seed: u64) -> Sequential {
    Sequential::build(
        &[784, 16, 10],
        Activation::Sigmoid,
        0.1,
        &ParamSource::Random { range: 0.5 },
        &mut StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

#[test]
fn block_patterns_are_learned() {
    let mut net = Orchestra::new(
        digits_net(3),
        TargetEncoding::for_activation(Activation::Sigmoid),
    )
    .train_dataloader(Box::new(block_loader(30)))
    .test_dataloader(Box::new(block_loader(1)));

    let mut reports = vec![net.test_net().unwrap()];
    reports.extend(net.train_epochs(3).unwrap());

    // better than chance after the first epoch
    assert!(
        reports[1].accuracy() > 0.1,
        "accuracy after one epoch {}",
        reports[1].accuracy()
    );

    assert_eq!(reports.len(), 4);
    for pair in reports.windows(2) {
        assert!(
            pair[1].loss < pair[0].loss,
            "test loss went from {} to {}",
            pair[0].loss,
            pair[1].loss
        );
    }

    let last = reports[reports.len() - 1];
    assert_eq!(last.total, 10);
    assert!(last.accuracy() > 0.5, "accuracy {}", last.accuracy());
    assert_eq!(net.epoch(), 3);
}

#[test]
fn loss_decreases_on_repeated_example() {
    let mut net = Sequential::build(
        &[4, 3, 2],
        Activation::Sigmoid,
        0.2,
        &ParamSource::Random { range: 0.5 },
        &mut StdRng::seed_from_u64(21),
    )
    .unwrap();

    let input = arr1(&[0.1, 0.9, 0.3, 0.5]);
    let target = arr1(&[0.8, 0.2]);

    let mut prev = net.train(input.view(), target.view()).unwrap();
    for step in 0..100 {
        let loss = net.train(input.view(), target.view()).unwrap();
        assert!(loss < prev, "step {} : {} >= {}", step, loss, prev);
        prev = loss;
    }
}

#[test]
fn tanh_and_gelu_networks_train() {
    for act in [Activation::Tanh, Activation::Gelu] {
        let mut net = Sequential::build(
            &[3, 4, 2],
            act,
            0.05,
            &ParamSource::Random { range: 0.5 },
            &mut StdRng::seed_from_u64(9),
        )
        .unwrap();

        let input = arr1(&[0.2, 0.7, 0.4]);
        let target = TargetEncoding::for_activation(act).encode(1, 2).unwrap();

        let first = net.train(input.view(), target.view()).unwrap();
        let mut last = first;
        for _ in 0..50 {
            last = net.train(input.view(), target.view()).unwrap();
        }

        assert!(last < first, "{} : {} >= {}", act, last, first);
    }
}

#[test]
fn evaluation_leaves_weights_untouched() {
    let mut net = Orchestra::new(
        digits_net(5),
        TargetEncoding::for_activation(Activation::Sigmoid),
    )
    .test_dataloader(Box::new(block_loader(2)));

    let before: Vec<_> = net.model().layers().to_vec();
    let first = net.test_net().unwrap();
    let second = net.test_net().unwrap();

    assert_eq!(first, second);
    assert_eq!(net.model().layers(), before.as_slice());

    let input: Array1<Float> = Array1::from(block_image(4));
    let label = net.model().classify(input.view()).unwrap();
    assert_eq!(net.model_mut().classify(input.view()).unwrap(), label);
}

#[test]
fn callback_stops_training() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_cb = Rc::clone(&seen);

    let mut net = Orchestra::new(
        digits_net(1),
        TargetEncoding::for_activation(Activation::Sigmoid),
    )
    .train_dataloader(Box::new(block_loader(2)))
    .test_dataloader(Box::new(block_loader(1)))
    .shuffle(4);

    net.add_callback(Box::new(move |epoch: usize, _report: &EvalReport| {
        seen_cb.borrow_mut().push(epoch);
        if epoch == 2 {
            CallbackReturnAction::Stop
        } else {
            CallbackReturnAction::None
        }
    }));

    net.train_until_stopped(Some(10)).unwrap();

    assert_eq!(*seen.borrow(), vec![1, 2]);
    assert_eq!(net.epoch(), 2);
}

#[test]
fn max_epochs_bounds_training() {
    let mut net = Orchestra::new(
        digits_net(1),
        TargetEncoding::for_activation(Activation::Sigmoid),
    )
    .train_dataloader(Box::new(block_loader(1)))
    .test_dataloader(Box::new(block_loader(1)));

    let report = net.train_until_stopped(Some(2)).unwrap();

    assert_eq!(net.epoch(), 2);
    assert_eq!(report.total, 10);
}

#[test]
fn training_without_examples_fails() {
    let mut net = Orchestra::new(
        digits_net(1),
        TargetEncoding::for_activation(Activation::Sigmoid),
    )
    .train_dataloader(Box::new(SimpleDataLoader::empty()));

    assert!(matches!(net.train_epoch(), Err(NetError::Dataset(_))));
    assert!(matches!(net.test_net(), Err(NetError::Dataset(_))));
}
