//! 试卷处理上下文
//!
//! 封装"我正在处理本次请求的第几张试卷"这一信息

use std::fmt::Display;

/// 试卷处理上下文
#[derive(Debug, Clone, Copy)]
pub struct PaperCtx {
    /// 试卷在请求中的索引（从0开始，与返回结果顺序一致）
    pub paper_index: usize,

    /// 本次请求的试卷总数
    pub total: usize,
}

impl PaperCtx {
    pub fn new(paper_index: usize, total: usize) -> Self {
        Self { paper_index, total }
    }
}

impl Display for PaperCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[试卷 {}/{}]", self.paper_index + 1, self.total)
    }
}
