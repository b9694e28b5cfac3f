use crate::core::{DedupError, DedupResult};
use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub mod average_hash;
pub mod config;

/// 固定長のビット列フィンガープリント
///
/// ビットは行優先で並び、各バイトの最上位ビットから詰める。
/// 最終バイトの余りビットは常に0。空のフィンガープリントは作れない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    hash_data: Vec<u8>,
    hash_size_bits: usize,
}

impl Fingerprint {
    /// ビット列からフィンガープリントを作成
    pub fn from_bits<I>(bits: I) -> DedupResult<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut hash_data = Vec::new();
        let mut current_byte = 0u8;
        let mut bit_count = 0;
        let mut hash_size_bits = 0;

        for bit in bits {
            current_byte = (current_byte << 1) | u8::from(bit);
            bit_count += 1;
            hash_size_bits += 1;

            if bit_count == 8 {
                hash_data.push(current_byte);
                current_byte = 0;
                bit_count = 0;
            }
        }

        // 残りのビットがある場合
        if bit_count > 0 {
            current_byte <<= 8 - bit_count;
            hash_data.push(current_byte);
        }

        if hash_size_bits == 0 {
            return Err(DedupError::configuration("フィンガープリントは1ビット以上必要です"));
        }

        Ok(Self {
            hash_data,
            hash_size_bits,
        })
    }

    /// "0101..." 形式の文字列からフィンガープリントを作成
    pub fn from_bit_str(bits: &str) -> DedupResult<Self> {
        let parsed = bits
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(DedupError::configuration(format!(
                    "フィンガープリントに不正な文字があります: {other:?}"
                ))),
            })
            .collect::<DedupResult<Vec<bool>>>()?;

        Self::from_bits(parsed)
    }

    /// ビット長
    pub fn len_bits(&self) -> usize {
        self.hash_size_bits
    }

    /// 指定位置のビットを取得
    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.hash_size_bits {
            return None;
        }
        let byte = self.hash_data[index / 8];
        Some(byte & (0x80 >> (index % 8)) != 0)
    }

    /// パック済みのバイト列
    pub fn as_bytes(&self) -> &[u8] {
        &self.hash_data
    }

    /// ハッシュを16進文字列として取得
    pub fn to_hex(&self) -> String {
        hex::encode(&self.hash_data)
    }

    /// ハッシュをビット文字列として取得（パディングは含まない）
    pub fn to_bits(&self) -> String {
        (0..self.hash_size_bits)
            .map(|i| if self.bit(i) == Some(true) { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bits)", self.to_hex(), self.hash_size_bits)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bits())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let bits = String::deserialize(deserializer)?;
        Fingerprint::from_bit_str(&bits).map_err(serde::de::Error::custom)
    }
}

/// ハッシュ計算の結果
#[derive(Debug, Clone)]
pub struct HashResult {
    pub fingerprint: Fingerprint,
    /// 計算時間（ミリ秒）
    pub computation_time_ms: u64,
    /// 元画像のサイズ
    pub source_dimensions: (u32, u32),
}

impl fmt::Display for HashResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hash({}ms): {}",
            self.computation_time_ms, self.fingerprint
        )
    }
}

/// 知覚ハッシュバックエンドのトレイト
#[async_trait]
pub trait PerceptualHashBackend: Send + Sync {
    /// 画像からハッシュを生成
    async fn generate_hash(&self, image: &DynamicImage) -> Result<HashResult>;

    /// 生成されるフィンガープリントのビット長
    fn hash_size_bits(&self) -> usize;

    /// アルゴリズムの名前を取得
    fn algorithm_name(&self) -> &'static str;
}
