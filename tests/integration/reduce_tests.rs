//! Reducer integration tests.
//!
//! Tests verify the blue-content statistic on single images and batches
//! through the public API.

use wsi_tiler::{
    blue_content, blue_content_batch, channel_mean_batch, ChannelMean, ReduceError, Reducer,
    TileBatch, TileImage,
};

#[test]
fn test_ones_give_one() {
    for (h, w, c) in [(1, 1, 2), (16, 16, 3), (7, 13, 4)] {
        assert_eq!(blue_content(&TileImage::ones(h, w, c)).unwrap(), 1.0);
    }
}

#[test]
fn test_batch_of_zero_and_two_images() {
    let batch = TileBatch::from_tiles(vec![
        (TileImage::zeros(32, 32, 3), 0),
        (TileImage::filled(32, 32, 3, 2.0), 1),
    ])
    .unwrap();

    assert_eq!(blue_content_batch(&batch).unwrap(), vec![0.0, 2.0]);
}

#[test]
fn test_batch_never_averages_across_images() {
    let batch = TileBatch::from_tiles(
        (0..5)
            .map(|i| (TileImage::filled(4, 4, 3, i as f32), i))
            .collect(),
    )
    .unwrap();

    let means = blue_content_batch(&batch).unwrap();
    assert_eq!(means.len(), batch.len());
    assert_eq!(means, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_reducer_is_idempotent() {
    let data: Vec<f32> = (0..8 * 8 * 3).map(|i| (i % 17) as f32 * 0.37).collect();
    let tile = TileImage::from_vec(8, 8, 3, data).unwrap();

    let first = blue_content(&tile).unwrap();
    let second = blue_content(&tile).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());

    let batch = TileBatch::from_tiles(vec![(tile.clone(), 0), (tile, 1)]).unwrap();
    assert_eq!(
        blue_content_batch(&batch).unwrap(),
        blue_content_batch(&batch).unwrap()
    );
}

#[test]
fn test_single_channel_rejected() {
    let batch = TileBatch::from_tiles(vec![(TileImage::ones(2, 2, 1), 0)]).unwrap();
    assert_eq!(
        blue_content_batch(&batch),
        Err(ReduceError::ChannelOutOfRange {
            channel: 1,
            channels: 1
        })
    );
    assert_eq!(channel_mean_batch(&batch, 0).unwrap(), vec![1.0]);
}

#[test]
fn test_reducer_trait_object() {
    let reducers: Vec<Box<dyn Reducer>> = vec![
        Box::new(ChannelMean::new(0)) as Box<dyn Reducer>,
        Box::new(ChannelMean::blue()),
    ];
    let tile = TileImage::from_vec(1, 1, 3, vec![3.0, 5.0, 7.0]).unwrap();

    let results: Vec<Vec<f32>> = reducers.iter().map(|r| r.reduce(&tile).unwrap()).collect();
    assert_eq!(results, vec![vec![3.0], vec![5.0]]);
}
