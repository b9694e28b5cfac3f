// フィンガープリント間の類似度計算

use crate::core::{DedupError, DedupResult};
use crate::perceptual_hash::Fingerprint;

/// 異なるビット位置の数（ハミング距離）
///
/// 長さの異なるフィンガープリントは比較できない。
pub fn hamming_distance(hash1: &Fingerprint, hash2: &Fingerprint) -> DedupResult<u32> {
    if hash1.len_bits() != hash2.len_bits() {
        return Err(DedupError::incompatible_hash(
            hash1.len_bits(),
            hash2.len_bits(),
        ));
    }

    // パディングビットは両方0なので数に入らない
    let distance = hash1
        .as_bytes()
        .iter()
        .zip(hash2.as_bytes().iter())
        .map(|(a, b)| (a ^ b).count_ones())
        .sum();

    Ok(distance)
}

/// 一致ビットの割合（0〜100）
pub fn similarity(hash1: &Fingerprint, hash2: &Fingerprint) -> DedupResult<f64> {
    let distance = hamming_distance(hash1, hash2)?;
    let length = hash1.len_bits() as f64;
    Ok(100.0 * (length - f64::from(distance)) / length)
}
