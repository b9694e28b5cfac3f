// 重複グループ化 - 貪欲なシングルリンク方式
//
// 入力順に未使用の画像を代表として選び、それ以降の未使用画像のうち
// 代表との類似度が閾値以上のものをまとめる。一度代表になった画像は
// グループが成立しなくても使用済みのまま残る。

use crate::core::{DedupError, DedupResult, ImageId, ImageRecord};
use crate::similarity::similarity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// デフォルトの類似度閾値（%）
pub const DEFAULT_THRESHOLD: f64 = 90.0;

/// 検証済みの類似度閾値（0〜100）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> DedupResult<Self> {
        if !(0.0..=100.0).contains(&value) {
            // NaNもここで弾かれる
            return Err(DedupError::invalid_threshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Threshold::new(value).map_err(serde::de::Error::custom)
    }
}

/// グループのメンバーと代表との類似度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub record: ImageRecord,
    /// 代表との類似度（代表自身は100）
    pub similarity: f64,
}

/// 重複グループ
///
/// 読み込み時にメンバーが2件未満のグループは拒否する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedGroup")]
pub struct DuplicateGroup {
    /// 先頭が代表（最初に出現した画像）
    pub members: Vec<GroupMember>,
    /// 代表と他メンバーとの類似度の最小値
    pub group_similarity: f64,
}

#[derive(Deserialize)]
struct UncheckedGroup {
    members: Vec<GroupMember>,
    group_similarity: f64,
}

impl TryFrom<UncheckedGroup> for DuplicateGroup {
    type Error = String;

    fn try_from(group: UncheckedGroup) -> Result<Self, Self::Error> {
        if group.members.len() < 2 {
            return Err(format!(
                "duplicate group needs at least 2 members, found {}",
                group.members.len()
            ));
        }
        Ok(Self {
            members: group.members,
            group_similarity: group.group_similarity,
        })
    }
}

impl DuplicateGroup {
    pub fn representative(&self) -> Option<&ImageRecord> {
        self.members.first().map(|member| &member.record)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// メンバーのIDを順番通りに取得
    pub fn ids(&self) -> impl Iterator<Item = &ImageId> {
        self.members.iter().map(|member| &member.record.id)
    }

    /// 代表以外のメンバー
    pub fn duplicates(&self) -> impl Iterator<Item = &GroupMember> {
        self.members.iter().skip(1)
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.ids().any(|member_id| member_id == id)
    }
}

/// 類似画像をグループ化する
///
/// 2件以上のグループのみを返す。閾値は計算前に検証する。
pub fn group_duplicates(
    images: &[ImageRecord],
    threshold: f64,
) -> DedupResult<Vec<DuplicateGroup>> {
    let threshold = Threshold::new(threshold)?;
    group_with_threshold(images, threshold)
}

/// 検証済みの閾値でグループ化する
pub fn group_with_threshold(
    images: &[ImageRecord],
    threshold: Threshold,
) -> DedupResult<Vec<DuplicateGroup>> {
    let mut groups = Vec::new();
    let mut consumed: HashSet<&ImageId> = HashSet::new();

    for (i, seed) in images.iter().enumerate() {
        if !consumed.insert(&seed.id) {
            continue;
        }

        let mut members = vec![GroupMember {
            record: seed.clone(),
            similarity: 100.0,
        }];

        for candidate in &images[i + 1..] {
            if consumed.contains(&candidate.id) {
                continue;
            }

            let score = similarity(&seed.fingerprint, &candidate.fingerprint)?;
            if score >= threshold.value() {
                consumed.insert(&candidate.id);
                members.push(GroupMember {
                    record: candidate.clone(),
                    similarity: score,
                });
            }
        }

        // 単独の画像はグループにしない
        if members.len() > 1 {
            let group_similarity = members
                .iter()
                .skip(1)
                .map(|member| member.similarity)
                .fold(f64::INFINITY, f64::min);

            groups.push(DuplicateGroup {
                members,
                group_similarity,
            });
        }
    }

    Ok(groups)
}

/// どのグループにも属さない画像のID（入力順）
pub fn unique_ids<'a>(images: &'a [ImageRecord], groups: &[DuplicateGroup]) -> Vec<&'a ImageId> {
    let grouped: HashSet<&ImageId> = groups.iter().flat_map(|group| group.ids()).collect();
    images
        .iter()
        .map(|record| &record.id)
        .filter(|id| !grouped.contains(id))
        .collect()
}
