//! 基础设施层
//!
//! 资源客户端是所有网络 I/O 的唯一出口，上层只通过它访问后端

pub mod api_client;
pub mod cancellation;
pub mod multipart;
pub mod progress;
pub mod request_scope;

pub use api_client::{ApiCall, ApiClient, AuthSignal, HttpMethod, RequestBody};
pub use cancellation::{RequestHandle, RequestId};
pub use multipart::{FieldData, MultipartForm, UPLOAD_CHUNK_SIZE};
pub use progress::{ProgressCallback, ProgressTracker};
pub use request_scope::{RequestScope, RequestState};
