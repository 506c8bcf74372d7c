//! Wire DTOs for the remote API.
//!
//! DTOs mirror the JSON the server sends and convert into domain types;
//! domain types never derive their shape from the wire format.

mod chat;
mod session;

pub use chat::{
    ChatResponseDto, CreateSessionRequest, FileStatusDto, TextChatRequest, UpdateSessionRequest,
    UploadResponseDto,
};
pub use session::{MessageDto, SessionDetailDto, SessionDto, ThinkingStepDto, parse_timestamp};
