pub mod chat;
pub mod model;
pub mod provider;

pub use chat::{ChatMessage, ChatResponse, ChatRole, ConsumeRequest};
pub use model::{Model, NewModel};
pub use provider::{
    AuthType, MessageTransform, ProviderConfig, ProviderCredentials, RequestSchema,
};
