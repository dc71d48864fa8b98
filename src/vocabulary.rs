//! 词库
//!
//! 启动时从外部 JSON 源加载一次的只读题目序列。源格式为
//! `[{ "id": 1, "w": "...", "o": ["...", "..."], "c": "..." }]`，
//! 持久化的错题本也沿用同样的字段名。

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, QuizResult};

/// 搜索返回的最大条数
pub const SEARCH_LIMIT: usize = 10;

/// 搜索关键字的最小长度（字符数）
pub const SEARCH_MIN_CHARS: usize = 2;

// ============================================================
// QuestionRecord - 题目
// ============================================================

/// 单选题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 关卡编号，词库内唯一
    pub id: u32,
    /// 题面（单词）
    #[serde(rename = "w")]
    pub prompt: String,
    /// 选项，至少两个
    #[serde(rename = "o")]
    pub options: Vec<String>,
    /// 正确选项，必须是 `options` 之一
    #[serde(rename = "c")]
    pub correct_answer: String,
}

impl QuestionRecord {
    pub fn new(
        id: u32,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
            correct_answer: correct_answer.into(),
        }
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.correct_answer
    }

    fn validate(&self) -> Result<(), String> {
        if self.options.len() < 2 {
            return Err(format!("题目 {} 的选项少于两个", self.id));
        }
        let matches = self
            .options
            .iter()
            .filter(|opt| **opt == self.correct_answer)
            .count();
        if matches != 1 {
            return Err(format!(
                "题目 {} 的正确答案必须恰好匹配一个选项（匹配 {} 个）",
                self.id, matches
            ));
        }
        Ok(())
    }
}

/// 源文件中的原始记录，id 允许任意整数以便校验
#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: i64,
    w: String,
    o: Vec<String>,
    c: String,
}

// ============================================================
// VocabularyStore - 只读词库
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct VocabularyStore {
    records: Vec<QuestionRecord>,
}

impl VocabularyStore {
    /// 从文件异步加载词库
    pub async fn load<P: AsRef<Path>>(path: P) -> QuizResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| QuizError::DataUnavailable(format!("{}: {}", path.display(), e)))?;

        let store = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), count = store.len(), "vocabulary loaded");
        Ok(store)
    }

    /// 从 JSON 文本解析词库
    pub fn from_json(raw: &str) -> QuizResult<Self> {
        let raw_records: Vec<RawQuestion> = serde_json::from_str(raw)
            .map_err(|e| QuizError::DataUnavailable(format!("词库格式错误: {}", e)))?;

        let records = raw_records
            .into_iter()
            .map(|r| -> QuizResult<QuestionRecord> {
                let id = u32::try_from(r.id)
                    .ok()
                    .filter(|id| *id >= 1)
                    .ok_or_else(|| {
                        QuizError::DataUnavailable(format!("无效的题目 id: {}", r.id))
                    })?;
                Ok(QuestionRecord::new(id, r.w, r.o, r.c))
            })
            .collect::<QuizResult<Vec<_>>>()?;

        Self::from_records(records)
    }

    /// 由已构造的题目创建词库，校验 id 唯一与选项合法
    pub fn from_records(records: Vec<QuestionRecord>) -> QuizResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.id == 0 {
                return Err(QuizError::DataUnavailable("题目 id 必须为正整数".into()));
            }
            if !seen.insert(record.id) {
                return Err(QuizError::DataUnavailable(format!(
                    "题目 id 重复: {}",
                    record.id
                )));
            }
            record.validate().map_err(QuizError::DataUnavailable)?;
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    pub fn find_by_id(&self, id: u32) -> Option<&QuestionRecord> {
        self.records.iter().find(|q| q.id == id)
    }

    /// `[from, to]` 范围内的题目，保持词库原有顺序
    pub fn in_range(&self, from: u32, to: u32) -> Vec<QuestionRecord> {
        self.records
            .iter()
            .filter(|q| q.id >= from && q.id <= to)
            .cloned()
            .collect()
    }

    /// 在题面和正确答案中做不区分大小写的子串搜索
    ///
    /// 关键字不足两个字符时返回空结果，最多返回前 10 条。空白也算作关键字的一部分。
    pub fn search(&self, query: &str) -> Vec<&QuestionRecord> {
        let query = query.to_lowercase();
        if query.chars().count() < SEARCH_MIN_CHARS {
            return Vec::new();
        }

        self.records
            .iter()
            .filter(|q| {
                q.prompt.to_lowercase().contains(&query)
                    || q.correct_answer.to_lowercase().contains(&query)
            })
            .take(SEARCH_LIMIT)
            .collect()
    }
}
