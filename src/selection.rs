// 削除対象の選択状態
//
// 選択されていないIDは全て「保持」扱い。どのグループにも属さないIDを
// 選択しても構わない。

use crate::core::{ImageId, ImageRecord};
use crate::grouping::DuplicateGroup;
use std::collections::BTreeSet;

/// 削除対象として選択されたIDの集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: BTreeSet<ImageId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 選択状態を反転
    pub fn toggle(&mut self, id: &ImageId) {
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
    }

    /// 代表以外のメンバーを選択
    pub fn select_group_except_first(&mut self, group: &DuplicateGroup) {
        self.selected.extend(group.ids().skip(1).cloned());
    }

    /// 代表を含む全メンバーを選択
    pub fn select_group_all(&mut self, group: &DuplicateGroup) {
        self.selected.extend(group.ids().cloned());
    }

    /// 全グループで代表以外を選択
    pub fn select_all_duplicates(&mut self, groups: &[DuplicateGroup]) {
        for group in groups {
            self.select_group_except_first(group);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &ImageId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// 選択中のID（ソート済み）
    pub fn selected_ids(&self) -> impl Iterator<Item = &ImageId> {
        self.selected.iter()
    }

    /// 選択されていない画像（入力順）
    pub fn remaining<'a>(&self, all_images: &'a [ImageRecord]) -> Vec<&'a ImageRecord> {
        all_images
            .iter()
            .filter(|record| !self.selected.contains(&record.id))
            .collect()
    }
}
