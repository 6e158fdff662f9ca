pub mod setup;
pub mod tools;
pub mod safety;
pub mod audio;
pub mod events;
pub mod input;
pub mod response;
mod content;

pub use content::parts::{ExecutableCode, InlineData, Part, TextPart};
pub use content::turn::{Role, Turn};
pub use events::{ClientMessage, ServerMessage};
pub use input::{Input, Prompt, Validation};
pub use response::{AudioPayload, CloseReason, Response, ResponseContent};
pub use tools::FunctionCall;
