//! HTTP 处理函数
//!
//! `POST /api/grade/` 同时接受 JSON 和 multipart/form-data 两种请求体

use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use tracing::{debug, info};

use crate::api::dto::{GradeRequestBody, GradeResponseBody, HealthBody};
use crate::api::server::AppState;
use crate::error::{AppError, AppResult, RequestError};
use crate::infrastructure::{paper_image_from_bytes, paper_images_from_base64};
use crate::models::{GradingRequest, PaperImage};

/// 首页：一个最简单的上传表单
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Grade Genie</title></head>
<body>
  <h1>Grade Genie</h1>
  <form id="grade-form" action="/api/grade/" method="post" enctype="multipart/form-data">
    <p><input type="file" name="images" accept="image/*" multiple required></p>
    <p><textarea name="instructions" rows="4" cols="60" placeholder="Grading instructions"></textarea></p>
    <p><button type="submit">Grade</button></p>
  </form>
  <div id="results"></div>
  <script>
    document.getElementById("grade-form").addEventListener("submit", async (event) => {
      event.preventDefault();
      const results = document.getElementById("results");
      results.textContent = "Grading...";
      const response = await fetch(event.target.action, { method: "POST", body: new FormData(event.target) });
      const data = await response.json();
      results.textContent = "";
      if (!data.success) { results.textContent = data.error; return; }
      data.graded_images.forEach((src, i) => {
        const figure = document.createElement("figure");
        const img = document.createElement("img");
        img.src = src;
        img.style.maxWidth = "480px";
        const caption = document.createElement("figcaption");
        caption.textContent = data.grades[i].grade + " - " + data.grades[i].feedback;
        figure.append(img, caption);
        results.append(figure);
      });
    });
  </script>
</body>
</html>
"#;

/// `GET /`
pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_string(),
        model: state.grader.model_name().to_string(),
    })
}

/// `POST /api/grade/`
pub async fn grade_papers(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> AppResult<Json<GradeResponseBody>> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let upload = match mime.as_str() {
        "application/json" => read_json(request).await?,
        "multipart/form-data" => read_multipart(request).await?,
        _ => {
            return Err(RequestError::UnsupportedContentType { content_type }.into());
        }
    };

    info!(
        "📥 收到评分请求: {} 张图片 ({})",
        upload.image_count(),
        mime
    );

    state.grader.check_count(upload.image_count())?;
    let images = upload.decode()?;

    let request = GradingRequest::new(images, upload.instructions);
    let graded = state.grader.grade_papers(&request).await?;

    Ok(Json(GradeResponseBody::from(graded)))
}

/// 尚未解码的上传内容
#[derive(Debug, Default)]
struct Upload {
    /// JSON 或表单文本字段里的 base64 图片
    encoded: Vec<String>,
    /// multipart 文件字段里的原始图片
    files: Vec<Vec<u8>>,
    instructions: String,
}

impl Upload {
    /// 有文件上传时以文件为准
    fn image_count(&self) -> usize {
        if self.files.is_empty() {
            self.encoded.len()
        } else {
            self.files.len()
        }
    }

    fn decode(&self) -> Result<Vec<PaperImage>, RequestError> {
        if self.files.is_empty() {
            return paper_images_from_base64(&self.encoded);
        }
        self.files
            .iter()
            .enumerate()
            .map(|(index, bytes)| paper_image_from_bytes(index, bytes.clone()))
            .collect()
    }
}

fn rejection_error(status: StatusCode, reason: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        RequestError::PayloadTooLarge.into()
    } else {
        AppError::malformed_body(reason)
    }
}

async fn read_json(request: Request) -> AppResult<Upload> {
    let Json(body) = Json::<GradeRequestBody>::from_request(request, &())
        .await
        .map_err(|rejection| rejection_error(rejection.status(), rejection.body_text()))?;

    Ok(Upload {
        encoded: body.images,
        files: Vec::new(),
        instructions: body.instructions.unwrap_or_default(),
    })
}

async fn read_multipart(request: Request) -> AppResult<Upload> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| rejection_error(rejection.status(), rejection.body_text()))?;

    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejection_error(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        match name.as_str() {
            "images" | "images[]" if is_file => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| rejection_error(e.status(), e.body_text()))?;
                // 表单未选择文件时浏览器仍会提交一个空的文件字段
                if bytes.is_empty() {
                    debug!("跳过空文件字段");
                    continue;
                }
                debug!("收到文件字段: {} 字节", bytes.len());
                upload.files.push(bytes.to_vec());
            }
            "images" | "images[]" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| rejection_error(e.status(), e.body_text()))?;
                if text.trim().is_empty() {
                    continue;
                }
                upload.encoded.push(text);
            }
            "instructions" => {
                upload.instructions = field
                    .text()
                    .await
                    .map_err(|e| rejection_error(e.status(), e.body_text()))?;
            }
            other => debug!("忽略未知字段: {}", other),
        }
    }

    Ok(upload)
}
