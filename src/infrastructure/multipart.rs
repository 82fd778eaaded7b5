//! multipart 表单
//!
//! 保存为普通数据，发送时才转换为 `reqwest::multipart::Form`，
//! 这样可以在发送前算出文件总字节数，用于上传进度

use crate::infrastructure::progress::ProgressTracker;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::path::Path;
use std::sync::Arc;

/// 上传时每次交给传输层的字节数
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// 表单字段内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldData {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// multipart 表单（字段按加入顺序发送）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<(String, FieldData)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加文本字段
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FieldData::Text(value.into())));
        self
    }

    /// 追加文件字段
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FieldData::File {
                file_name: file_name.into(),
                mime: mime.into(),
                bytes,
            },
        ));
        self
    }

    /// 从磁盘读取文件并追加为文件字段，MIME 类型按扩展名推断
    pub async fn file_from_path(self, name: impl Into<String>, path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime = guess_mime(path);
        Ok(self.file(name, file_name, mime, bytes))
    }

    pub fn fields(&self) -> &[(String, FieldData)] {
        &self.fields
    }

    /// 读取某个文本字段的值
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(n, data)| match data {
            FieldData::Text(value) if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// 所有文件字段的总字节数
    pub fn file_bytes(&self) -> u64 {
        self.fields
            .iter()
            .map(|(_, data)| match data {
                FieldData::File { bytes, .. } => bytes.len() as u64,
                FieldData::Text(_) => 0,
            })
            .sum()
    }

    /// 转换为 reqwest 表单；提供 tracker 时文件内容分块发送并上报进度
    pub(crate) fn into_reqwest(
        self,
        tracker: Option<Arc<ProgressTracker>>,
    ) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();

        for (name, data) in self.fields {
            match data {
                FieldData::Text(value) => {
                    form = form.text(name, value);
                }
                FieldData::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = match &tracker {
                        Some(tracker) => tracked_part(bytes, tracker.clone()),
                        None => Part::bytes(bytes),
                    };
                    form = form.part(name, part.file_name(file_name).mime_str(&mime)?);
                }
            }
        }

        Ok(form)
    }
}

fn tracked_part(bytes: Vec<u8>, tracker: Arc<ProgressTracker>) -> Part {
    let len = bytes.len() as u64;
    let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        tracker.advance(chunk.len() as u64);
        Ok::<_, std::io::Error>(chunk)
    });
    Part::stream_with_length(Body::wrap_stream(stream), len)
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}
