//! 评分结果解析 - 业务能力层
//!
//! 把模型返回的 `GRADE: ... FEEDBACK: ...` 文本拆成分数和评语

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use crate::models::GradeResult;

/// 模型没有给出分数时使用的占位
pub const UNKNOWN_GRADE: &str = "N/A";

const GRADE_PATTERN: &str = r"(?i)\bGRADE\s*:";
const FEEDBACK_PATTERN: &str = r"(?i)\bFEEDBACK\s*:";

struct Markers {
    grade: Regex,
    feedback: Regex,
}

impl Markers {
    fn build() -> Result<Self, regex::Error> {
        Ok(Self {
            grade: Regex::new(GRADE_PATTERN)?,
            feedback: Regex::new(FEEDBACK_PATTERN)?,
        })
    }
}

fn markers() -> Option<&'static Markers> {
    static MARKERS: OnceLock<Option<Markers>> = OnceLock::new();
    MARKERS
        .get_or_init(|| match Markers::build() {
            Ok(markers) => Some(markers),
            Err(e) => {
                warn!("⚠️ 评分标记正则编译失败: {}", e);
                None
            }
        })
        .as_ref()
}

/// 去掉首尾空白和 markdown 强调符号
fn clean(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '`'))
}

/// 取第一行非空内容作为分数
fn first_line(text: &str) -> &str {
    text.lines()
        .map(clean)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// 解析模型回复
///
/// - 没有 `GRADE:` 时分数为 `N/A`，评语为整段回复
/// - 有 `FEEDBACK:` 时评语取其后内容，否则评语为整段回复
/// - 分数之后的 `FEEDBACK:` 优先于分数之前的
pub fn parse_grade_response(reply: &str) -> GradeResult {
    let text = reply.trim();

    let Some((markers, grade_at)) =
        markers().and_then(|m| m.grade.find(text).map(|grade_at| (m, grade_at)))
    else {
        return GradeResult {
            grade: UNKNOWN_GRADE.to_string(),
            feedback: text.to_string(),
        };
    };

    let after = markers
        .feedback
        .find_iter(text)
        .find(|fb| fb.start() >= grade_at.end());
    let before = markers
        .feedback
        .find(text)
        .filter(|fb| fb.end() <= grade_at.start());

    let (grade, feedback) = match (after, before) {
        (Some(fb), _) => (
            first_line(&text[grade_at.end()..fb.start()]),
            clean(&text[fb.end()..]),
        ),
        // 评语写在分数前面
        (None, Some(fb)) => (
            first_line(&text[grade_at.end()..]),
            clean(&text[fb.end()..grade_at.start()]),
        ),
        (None, None) => (first_line(&text[grade_at.end()..]), text),
    };

    let grade = if grade.is_empty() { UNKNOWN_GRADE } else { grade };

    GradeResult {
        grade: grade.to_string(),
        feedback: feedback.to_string(),
    }
}
